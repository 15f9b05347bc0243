//! API client context for sharing a singleton client instance.
//!
//! # Design
//! - Create exactly one API client per app boot.
//! - Update the bearer token via interior mutability to avoid rebuilding clients.

use crate::services::api::ApiClient;
use atelier_core::StorefrontConfig;
use std::rc::Rc;

/// Shared API client context for UI services.
#[derive(Clone)]
pub(crate) struct ApiCtx {
    /// Singleton API client instance.
    pub client: Rc<ApiClient>,
}

impl ApiCtx {
    /// Create a new context for the given storefront configuration.
    pub(crate) fn new(config: StorefrontConfig) -> Self {
        Self {
            client: Rc::new(ApiClient::new(config)),
        }
    }
}

impl PartialEq for ApiCtx {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.client, &other.client)
    }
}
