//! Bridge to the OAuth session provider.
//!
//! The provider exposes its session as JSON on the page origin. An empty object
//! means nobody is signed in; a session whose backend exchange has not finished
//! carries a user but no `backendToken`.

use atelier_api_models::SessionPayload;
use atelier_core::Session;
use gloo_net::http::Request;

use crate::core::logic::SESSION_ENDPOINT;

/// How often the session is re-read while the app is open.
pub(crate) const SESSION_POLL_MS: u32 = 60_000;

pub(crate) async fn fetch_session() -> Result<Session, gloo_net::Error> {
    let payload = Request::get(SESSION_ENDPOINT)
        .send()
        .await?
        .json::<SessionPayload>()
        .await?;
    Ok(Session::from(payload))
}
