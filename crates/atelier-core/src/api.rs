//! Transport-agnostic storefront API seams.
//!
//! The wasm UI implements these with `gloo-net`, the CLI with `reqwest`.
//! Implementations decode the response envelope at the boundary and report
//! failures as [`ActionError`](crate::ActionError) values.

use async_trait::async_trait;
use atelier_api_models::{
    AuthPayload, LikeCheck, LikeToggle, LoginRequest, Purchase, SubscriptionStatus, UserProfile,
};

use crate::error::ActionResult;

/// Like endpoints.
#[async_trait(?Send)]
pub trait LikesApi {
    /// `POST /likes/{design_id}/toggle`.
    async fn toggle_like(&self, design_id: &str) -> ActionResult<LikeToggle>;
    /// `GET /likes/{design_id}/check`.
    async fn check_like(&self, design_id: &str) -> ActionResult<LikeCheck>;
}

/// Purchase and subscription endpoints feeding the access evaluator.
#[async_trait(?Send)]
pub trait EntitlementsApi {
    /// `GET /purchases/mine?limit={limit}`.
    async fn my_purchases(&self, limit: u32) -> ActionResult<Vec<Purchase>>;
    /// `GET /subscription/status`.
    async fn subscription_status(&self) -> ActionResult<SubscriptionStatus>;
}

/// Credentials login and profile endpoints.
#[async_trait(?Send)]
pub trait AuthApi {
    /// `POST /auth/login`.
    async fn login(&self, request: &LoginRequest) -> ActionResult<AuthPayload>;
    /// `GET /auth/me`.
    async fn current_user(&self) -> ActionResult<UserProfile>;
}
