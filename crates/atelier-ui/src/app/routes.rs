//! Routing definitions for the storefront UI.
use yew_router::prelude::*;

#[derive(Clone, Routable, PartialEq, Eq, Debug)]
pub(crate) enum Route {
    #[at("/")]
    Home,
    #[at("/designs/:id")]
    Design { id: String },
    #[at("/login")]
    Login,
    #[not_found]
    #[at("/404")]
    NotFound,
}
