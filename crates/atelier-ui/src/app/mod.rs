use std::rc::Rc;

use crate::components::design::DesignPage;
use crate::components::login::LoginPage;
use crate::components::toast::ToastHost;
use crate::core::store::{
    AppStore, apply_session, auth_memo, begin_access_load, logout, restore_auth, set_entitlements,
};
use crate::models::{Toast, ToastKind, dismiss_toast, queue_toast};
use atelier_core::{ActionError, Credential, CredentialStore, Entitlements};
use gloo::console;
use gloo::timers::callback::Interval;
use gloo::utils::window;
use preferences::{
    clear_credential, load_auth_memo, load_credential, persist_session_action, storefront_config,
};
use session::{SESSION_POLL_MS, fetch_session};
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::{Dispatch, use_selector};

pub(crate) use api::ApiCtx;
pub(crate) use routes::Route;

mod api;
pub(crate) mod preferences;
mod routes;
mod session;

/// Toast sink handed to components through context.
#[derive(Clone, PartialEq)]
pub(crate) struct Notifier(Callback<(ToastKind, String)>);

impl Notifier {
    pub(crate) fn info(&self, message: impl Into<String>) {
        self.0.emit((ToastKind::Info, message.into()));
    }

    pub(crate) fn success(&self, message: impl Into<String>) {
        self.0.emit((ToastKind::Success, message.into()));
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        self.0.emit((ToastKind::Error, message.into()));
    }
}

#[derive(Default, PartialEq)]
struct ToastList {
    next_id: u64,
    items: Vec<Toast>,
}

enum ToastAction {
    Push(ToastKind, String),
    Dismiss(u64),
}

impl Reducible for ToastList {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            ToastAction::Push(kind, message) => {
                let id = self.next_id + 1;
                Rc::new(Self {
                    next_id: id,
                    items: queue_toast(&self.items, Toast { id, message, kind }),
                })
            }
            ToastAction::Dismiss(id) => Rc::new(Self {
                next_id: self.next_id,
                items: dismiss_toast(&self.items, id),
            }),
        }
    }
}

pub(crate) const PERSIST_FAILED: &str = "Could not save your sign-in; reloading the page will sign you out";

/// Send the browser to the login page when `err` asks for it.
///
/// Returns `false` for errors that are not about authentication.
pub(crate) fn redirect_to_login(err: &ActionError, login_path: &str) -> bool {
    let Some(href) = err.login_redirect(login_path) else {
        return false;
    };
    if let Err(err) = window().location().set_href(&href) {
        console::error!("login redirect failed", err);
    }
    true
}

#[function_component(AtelierApp)]
pub(crate) fn atelier_app() -> Html {
    let dispatch = Dispatch::<AppStore>::new();
    let api_ctx = use_memo(|_| ApiCtx::new(storefront_config()), ());
    let toasts = use_reducer(ToastList::default);
    let credential = use_selector(|store: &AppStore| store.auth.credential.get());
    let signed_in = use_selector(|store: &AppStore| store.auth.signed_in());
    let notifier = {
        let toasts = toasts.clone();
        Notifier(Callback::from(move |(kind, message): (ToastKind, String)| {
            toasts.dispatch(ToastAction::Push(kind, message));
        }))
    };

    {
        let dispatch = dispatch.clone();
        let api_ctx = api_ctx.clone();
        use_effect_with_deps(
            move |_| {
                let config = api_ctx.client.config();
                let credential = load_credential(config);
                let memo = load_auth_memo(config);
                dispatch.reduce_mut(|store| restore_auth(store, credential, memo));
                || ()
            },
            (),
        );
    }
    {
        let dispatch = dispatch.clone();
        let api_ctx = api_ctx.clone();
        let notifier = notifier.clone();
        use_effect_with_deps(
            move |_| {
                let sync = Callback::from(move |()| {
                    let dispatch = dispatch.clone();
                    let client = api_ctx.client.clone();
                    let notifier = notifier.clone();
                    yew::platform::spawn_local(async move {
                        match fetch_session().await {
                            Ok(session) => {
                                let mut session = Some(session);
                                let mut outcome = None;
                                dispatch.reduce_mut(|store| {
                                    if let Some(session) = session.take() {
                                        let before = auth_memo(store);
                                        let action = apply_session(store, session);
                                        let after = auth_memo(store);
                                        outcome = (after != before).then_some((action, after));
                                    }
                                });
                                if let Some((action, memo)) = outcome {
                                    if persist_session_action(client.config(), &action, &memo)
                                        .is_err()
                                    {
                                        notifier.error(PERSIST_FAILED);
                                    }
                                }
                            }
                            Err(err) => {
                                console::warn!("session lookup failed", err.to_string());
                            }
                        }
                    });
                });
                sync.emit(());
                let interval = Interval::new(SESSION_POLL_MS, move || sync.emit(()));
                move || drop(interval)
            },
            (),
        );
    }
    {
        let dispatch = dispatch.clone();
        let api_ctx = api_ctx.clone();
        use_effect_with_deps(
            move |credential: &Rc<Option<Credential>>| {
                let client = api_ctx.client.clone();
                let current = (**credential).clone();
                client.set_credential(current.as_ref());
                if let Some(token) = current
                    .filter(Credential::has_token)
                    .map(|credential| credential.token)
                {
                    dispatch.reduce_mut(begin_access_load);
                    yew::platform::spawn_local(async move {
                        let limit = client.config().purchases_limit;
                        let entitlements = Entitlements::load(&*client, true, limit).await;
                        let mut entitlements = Some(entitlements);
                        dispatch.reduce_mut(|store| {
                            let still_current = store
                                .auth
                                .credential
                                .get()
                                .is_some_and(|credential| credential.token == token);
                            if let (true, Some(entitlements)) = (still_current, entitlements.take())
                            {
                                set_entitlements(store, entitlements);
                            }
                        });
                    });
                }
                || ()
            },
            credential,
        );
    }

    let dismiss = {
        let toasts = toasts.clone();
        Callback::from(move |id: u64| toasts.dispatch(ToastAction::Dismiss(id)))
    };
    let on_logout = {
        let dispatch = dispatch.clone();
        let api_ctx = api_ctx.clone();
        let notifier = notifier.clone();
        Callback::from(move |_: MouseEvent| {
            clear_credential(api_ctx.client.config());
            dispatch.reduce_mut(logout);
            notifier.info("Signed out");
        })
    };
    let signed_in = *signed_in;

    html! {
        <ContextProvider<ApiCtx> context={(*api_ctx).clone()}>
            <ContextProvider<Notifier> context={notifier}>
                <BrowserRouter>
                    <header class="storefront-header">
                        <Link<Route> to={Route::Home} classes="brand">{"Atelier"}</Link<Route>>
                        {if signed_in {
                            html! { <button class="ghost" onclick={on_logout}>{"Sign out"}</button> }
                        } else {
                            html! { <Link<Route> to={Route::Login} classes="ghost">{"Sign in"}</Link<Route>> }
                        }}
                    </header>
                    <main class="storefront">
                        <Switch<Route> render={switch} />
                    </main>
                    <ToastHost toasts={toasts.items.clone()} on_dismiss={dismiss} />
                </BrowserRouter>
            </ContextProvider<Notifier>>
        </ContextProvider<ApiCtx>>
    }
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! {
            <div class="placeholder">
                <h2>{"Design marketplace"}</h2>
                <p class="muted">{"Open a design link to like or download it."}</p>
            </div>
        },
        Route::Design { id } => html! { <DesignPage {id} /> },
        Route::Login => html! { <LoginPage /> },
        Route::NotFound => html! {
            <div class="placeholder">
                <h2>{"Not found"}</h2>
                <Link<Route> to={Route::Home}>{"Back to the storefront"}</Link<Route>>
            </div>
        },
    }
}

/// Mount the storefront into `#root`, or the document body when it is missing.
pub fn run_app() {
    console_error_panic_hook::set_once();
    if let Some(root) = gloo::utils::document().get_element_by_id("root") {
        yew::Renderer::<AtelierApp>::with_root(root).render();
    } else {
        yew::Renderer::<AtelierApp>::new().render();
    }
}
