//! Email/password sign-in form.
//!
//! OAuth sign-in is handled by the session provider; this form covers the
//! credentials flow and lands the viewer back on `callbackUrl`.

use crate::app::preferences::persist_login;
use crate::app::{ApiCtx, Notifier, PERSIST_FAILED, Route};
use crate::core::logic::safe_return_path;
use crate::core::store::{AppStore, auth_memo, login_succeeded};
use atelier_api_models::LoginRequest;
use atelier_core::{AuthApi, Credential};
use serde::Deserialize;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::Dispatch;

#[derive(Deserialize)]
struct LoginQuery {
    #[serde(rename = "callbackUrl")]
    callback_url: Option<String>,
}

#[function_component(LoginPage)]
pub(crate) fn login_page() -> Html {
    let api = use_context::<ApiCtx>();
    let notifier = use_context::<Notifier>();
    let navigator = use_navigator();
    let location = use_location();
    let dispatch = Dispatch::<AppStore>::new();
    let email = use_state(String::new);
    let password = use_state(String::new);
    let busy = use_state(|| false);
    let error = use_state(|| None as Option<String>);

    let callback = location
        .and_then(|location| location.query::<LoginQuery>().ok())
        .and_then(|query| query.callback_url);
    let return_to = safe_return_path(callback.as_deref());

    let onsubmit = {
        let email = email.clone();
        let password = password.clone();
        let busy = busy.clone();
        let error = error.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let Some(api) = api.clone() else {
                return;
            };
            let request = LoginRequest {
                email: email.trim().to_string(),
                password: (*password).clone(),
            };
            if request.email.is_empty() || request.password.is_empty() {
                error.set(Some("Email and password are required".to_string()));
                return;
            }
            busy.set(true);
            error.set(None);

            let client = api.client.clone();
            let dispatch = dispatch.clone();
            let notifier = notifier.clone();
            let navigator = navigator.clone();
            let busy = busy.clone();
            let error = error.clone();
            let target = return_to_route(&return_to);
            yew::platform::spawn_local(async move {
                match client.login(&request).await {
                    Ok(payload) => {
                        let credential = Credential::from(payload);
                        if credential.has_token() {
                            let mut pending = Some(credential.clone());
                            let mut memo = None;
                            dispatch.reduce_mut(|store| {
                                if let Some(credential) = pending.take() {
                                    login_succeeded(store, credential);
                                    memo = Some(auth_memo(store));
                                }
                            });
                            let saved = memo.map_or(Ok(()), |memo| {
                                persist_login(client.config(), &credential, &memo)
                            });
                            if let Some(notifier) = &notifier {
                                if saved.is_err() {
                                    notifier.error(PERSIST_FAILED);
                                }
                                notifier.success("Signed in");
                            }
                            if let Some(navigator) = &navigator {
                                navigator.push(&target);
                            }
                        } else {
                            error.set(Some("Sign-in did not return a session".to_string()));
                        }
                    }
                    Err(err) => error.set(Some(err.notification())),
                }
                busy.set(false);
            });
        })
    };

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                email.set(input.value());
            }
        })
    };
    let on_password = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                password.set(input.value());
            }
        })
    };

    html! {
        <form class="card login" {onsubmit}>
            <header>
                <h2>{"Sign in"}</h2>
            </header>
            <label class="stack">
                <span>{"Email"}</span>
                <input type="email" autocomplete="email" value={(*email).clone()} oninput={on_email} />
            </label>
            <label class="stack">
                <span>{"Password"}</span>
                <input type="password" autocomplete="current-password" value={(*password).clone()} oninput={on_password} />
            </label>
            {if let Some(err) = &*error {
                html! { <p class="error-text" role="alert">{err}</p> }
            } else { html! {} }}
            <div class="actions">
                <button class="solid" type="submit" disabled={*busy}>
                    {if *busy { "Signing in…" } else { "Sign in" }}
                </button>
            </div>
        </form>
    }
}

fn return_to_route(path: &str) -> Route {
    let pathname = path.split(['?', '#']).next().unwrap_or("/");
    Route::recognize(pathname).unwrap_or(Route::Home)
}
