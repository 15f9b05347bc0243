//! HTTP client for the storefront API (REST).
//!
//! # Design
//! - One client per app boot; the bearer token is swapped in place when the credential changes.
//! - Every response goes through the envelope decoder, so malformed bodies surface as
//!   `ServerRejected` instead of panicking a component.

use std::cell::RefCell;

use async_trait::async_trait;
use atelier_api_models::{
    ApiEnvelope, AuthPayload, DesignSummary, LikeCheck, LikeToggle, LoginRequest, Purchase,
    SubscriptionStatus, UserProfile,
};
use atelier_core::{
    ActionError, ActionResult, AuthApi, Credential, EntitlementsApi, LikesApi, StorefrontConfig,
};
use gloo::utils::window;
use gloo_net::http::Request;
use serde::de::DeserializeOwned;

pub(crate) struct ApiClient {
    config: StorefrontConfig,
    token: RefCell<Option<String>>,
}

impl ApiClient {
    pub(crate) const fn new(config: StorefrontConfig) -> Self {
        Self {
            config,
            token: RefCell::new(None),
        }
    }

    pub(crate) const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Use `credential` for subsequent requests; `None` sends them anonymously.
    pub(crate) fn set_credential(&self, credential: Option<&Credential>) {
        *self.token.borrow_mut() = credential
            .filter(|credential| credential.has_token())
            .map(|credential| credential.token.clone());
    }

    fn authorize(&self, request: Request) -> Request {
        match self.token.borrow().as_deref() {
            Some(token) => request.header("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: Request, path: &str) -> ActionResult<T> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(ActionError::network)?;
        let status = response.status();
        let body = response.text().await.map_err(ActionError::network)?;
        if status == 401 {
            return Err(ActionError::auth_required(current_path()));
        }
        match ApiEnvelope::<T>::from_json_str(&body) {
            Ok(envelope) => Ok(envelope.into_data()?),
            Err(_) if !(200..300).contains(&status) => Err(ActionError::ServerRejected {
                message: format!("request to {path} failed with status {status}"),
            }),
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) async fn fetch_design(&self, design_id: &str) -> ActionResult<DesignSummary> {
        let path = format!("/designs/{}", urlencoding::encode(design_id));
        self.send(Request::get(&self.config.endpoint(&path)), &path)
            .await
    }
}

#[async_trait(?Send)]
impl LikesApi for ApiClient {
    async fn toggle_like(&self, design_id: &str) -> ActionResult<LikeToggle> {
        let path = format!("/likes/{}/toggle", urlencoding::encode(design_id));
        self.send(Request::post(&self.config.endpoint(&path)), &path)
            .await
    }

    async fn check_like(&self, design_id: &str) -> ActionResult<LikeCheck> {
        let path = format!("/likes/{}/check", urlencoding::encode(design_id));
        self.send(Request::get(&self.config.endpoint(&path)), &path)
            .await
    }
}

#[async_trait(?Send)]
impl EntitlementsApi for ApiClient {
    async fn my_purchases(&self, limit: u32) -> ActionResult<Vec<Purchase>> {
        let path = format!("/purchases/mine?limit={limit}");
        self.send(Request::get(&self.config.endpoint(&path)), "/purchases/mine")
            .await
    }

    async fn subscription_status(&self) -> ActionResult<SubscriptionStatus> {
        let path = "/subscription/status";
        self.send(Request::get(&self.config.endpoint(path)), path)
            .await
    }
}

#[async_trait(?Send)]
impl AuthApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> ActionResult<AuthPayload> {
        let path = "/auth/login";
        let request = Request::post(&self.config.endpoint(path))
            .json(request)
            .map_err(ActionError::network)?;
        self.send(request, path).await
    }

    async fn current_user(&self) -> ActionResult<UserProfile> {
        let path = "/auth/me";
        self.send(Request::get(&self.config.endpoint(path)), path)
            .await
    }
}

fn current_path() -> String {
    window()
        .location()
        .pathname()
        .unwrap_or_else(|_| "/".to_string())
}
