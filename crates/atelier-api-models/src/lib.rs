#![forbid(unsafe_code)]
#![deny(
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Atelier storefront API.
//!
//! Every endpoint answers with the same [`ApiEnvelope`] wrapper. Callers decode
//! the envelope with [`ApiEnvelope::from_json_str`] and unwrap it with
//! [`ApiEnvelope::into_data`], so malformed or rejected payloads are turned into
//! an [`EnvelopeError`] at the boundary instead of leaking untyped JSON inward.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel used by the API for "no download cap".
pub const UNLIMITED_DOWNLOADS: i64 = -1;

/// Failure to turn a response envelope into typed data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The server answered with `success = false`.
    #[error("request rejected: {message}")]
    Rejected {
        /// Server-provided reason (the `error` field, or `message` when absent).
        message: String,
    },
    /// The server reported success but omitted the `data` payload.
    #[error("response carried no data: {message}")]
    MissingData {
        /// Server-provided message accompanying the empty payload.
        message: String,
    },
    /// The body was not a valid envelope for the expected payload type.
    #[error("malformed response envelope: {detail}")]
    Malformed {
        /// Decoder diagnostic.
        detail: String,
    },
}

/// Uniform response wrapper returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiEnvelope<T> {
    /// Whether the server considers the request successful.
    pub success: bool,
    /// Human-readable status message.
    #[serde(default)]
    pub message: String,
    /// Endpoint-specific payload.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Pagination metadata for list endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// Error detail when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: DeserializeOwned> ApiEnvelope<T> {
    /// Decode an envelope from a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Malformed`] when the body does not match the
    /// envelope shape or the payload type.
    pub fn from_json_str(body: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(body).map_err(|err| EnvelopeError::Malformed {
            detail: err.to_string(),
        })
    }
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, treating rejection and missing data as failures.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Rejected`] for `success = false` and
    /// [`EnvelopeError::MissingData`] when `data` is absent.
    pub fn into_data(self) -> Result<T, EnvelopeError> {
        if !self.success {
            let message = self
                .error
                .filter(|error| !error.trim().is_empty())
                .unwrap_or(self.message);
            return Err(EnvelopeError::Rejected { message });
        }
        self.data.ok_or(EnvelopeError::MissingData {
            message: self.message,
        })
    }

    /// Unwrap the payload together with its pagination metadata.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ApiEnvelope::into_data`].
    pub fn into_page(self) -> Result<(T, Option<Pagination>), EnvelopeError> {
        let pagination = self.pagination.clone();
        self.into_data().map(|data| (data, pagination))
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page, 1-based.
    #[serde(default)]
    pub page: u32,
    /// Page size requested.
    #[serde(default)]
    pub limit: u32,
    /// Total number of records.
    #[serde(default)]
    pub total: u64,
    /// Total number of pages.
    #[serde(default)]
    pub pages: u32,
}

/// Account role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular customer.
    #[default]
    User,
    /// Marketplace administrator.
    Admin,
}

/// Public profile of the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend user identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Account email.
    pub email: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Account role.
    #[serde(default)]
    pub role: UserRole,
}

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Payload returned by login and OAuth exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthPayload {
    /// Signed-in user.
    pub user: UserProfile,
    /// Backend bearer token.
    pub token: String,
}

/// Session document served by the OAuth session provider.
///
/// An unauthenticated session is served as an empty object, so every field
/// is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// User attached to the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    /// Backend token obtained during the provider's OAuth exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_token: Option<String>,
    /// Session expiry as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

/// Response of `POST /likes/{designId}/toggle`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    /// Whether the design is liked after the toggle.
    pub liked: bool,
    /// Authoritative like count after the toggle.
    pub likes_count: u64,
}

/// Response of `GET /likes/{designId}/check`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikeCheck {
    /// Whether the caller has liked the design.
    pub liked: bool,
}

/// Reference to a design embedded in other records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DesignRef {
    /// Design identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Design title, when populated by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Public design card from `GET /designs/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DesignSummary {
    /// Design identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Display title.
    pub title: String,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Public like count.
    #[serde(default)]
    pub likes_count: u64,
    /// Individual purchase price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Kind of purchase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseType {
    /// Single design bought outright.
    Individual,
    /// Subscription plan purchase.
    Subscription,
}

/// Lifecycle of a purchase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    /// Payment initiated but not confirmed.
    Pending,
    /// Payment confirmed.
    Completed,
    /// Access window elapsed.
    Expired,
    /// Cancelled before completion.
    Cancelled,
    /// Refunded after completion.
    Refunded,
}

impl PurchaseStatus {
    /// Wire label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

/// Purchase record from `GET /purchases/mine`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Purchase identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Individual or subscription purchase.
    pub purchase_type: PurchaseType,
    /// Purchased design for individual purchases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<DesignRef>,
    /// Current purchase status.
    pub status: PurchaseStatus,
    /// Amount charged, in the purchase currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// ISO currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Download counters attached to a subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadStats {
    /// Downloads left in the period, [`UNLIMITED_DOWNLOADS`] for no cap.
    pub remaining_downloads: i64,
    /// Downloads used in the period.
    #[serde(default)]
    pub used_downloads: u64,
}

impl DownloadStats {
    /// Whether the plan has no download cap.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.remaining_downloads == UNLIMITED_DOWNLOADS
    }
}

/// Response of `GET /subscription/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    /// Whether the caller has an active subscription.
    pub has_active_subscription: bool,
    /// Download counters, absent for users without a plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_stats: Option<DownloadStats>,
    /// Plan name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// End of the current billing period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_envelope_decodes_camel_case_payload() {
        let body = r#"{"success":true,"message":"Design liked","data":{"liked":true,"likesCount":4}}"#;
        let envelope = ApiEnvelope::<LikeToggle>::from_json_str(body).expect("valid envelope");
        let toggle = envelope.into_data().expect("payload present");
        assert_eq!(
            toggle,
            LikeToggle {
                liked: true,
                likes_count: 4
            }
        );
    }

    #[test]
    fn rejected_envelope_prefers_error_field() {
        let body = r#"{"success":false,"message":"Request failed","error":"Design not found"}"#;
        let err = ApiEnvelope::<LikeToggle>::from_json_str(body)
            .expect("valid envelope")
            .into_data()
            .expect_err("rejected");
        assert_eq!(
            err,
            EnvelopeError::Rejected {
                message: "Design not found".to_string()
            }
        );
    }

    #[test]
    fn rejected_envelope_falls_back_to_message() {
        let body = r#"{"success":false,"message":"Unauthorized","error":"  "}"#;
        let err = ApiEnvelope::<LikeCheck>::from_json_str(body)
            .expect("valid envelope")
            .into_data()
            .expect_err("rejected");
        assert_eq!(
            err,
            EnvelopeError::Rejected {
                message: "Unauthorized".to_string()
            }
        );
    }

    #[test]
    fn successful_envelope_without_data_is_an_error() {
        let body = r#"{"success":true,"message":"ok"}"#;
        let err = ApiEnvelope::<LikeCheck>::from_json_str(body)
            .expect("valid envelope")
            .into_data()
            .expect_err("missing data");
        assert!(matches!(err, EnvelopeError::MissingData { .. }));
    }

    #[test]
    fn wrong_payload_shape_is_malformed() {
        let body = r#"{"success":true,"message":"ok","data":{"liked":"yes"}}"#;
        let err = ApiEnvelope::<LikeCheck>::from_json_str(body).expect_err("malformed");
        assert!(matches!(err, EnvelopeError::Malformed { .. }));
    }

    #[test]
    fn purchases_accept_mongo_style_ids_and_pagination() {
        let body = r#"{
            "success": true,
            "message": "Purchases fetched",
            "data": [{
                "_id": "p1",
                "purchaseType": "individual",
                "design": {"_id": "d1", "title": "Poster"},
                "status": "completed",
                "amount": 12.5,
                "createdAt": "2026-01-02T03:04:05Z"
            }],
            "pagination": {"page": 1, "limit": 50, "total": 1, "pages": 1}
        }"#;
        let (purchases, pagination) = ApiEnvelope::<Vec<Purchase>>::from_json_str(body)
            .expect("valid envelope")
            .into_page()
            .expect("payload present");
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].id, "p1");
        assert_eq!(purchases[0].purchase_type, PurchaseType::Individual);
        assert_eq!(
            purchases[0].design.as_ref().map(|design| design.id.as_str()),
            Some("d1")
        );
        assert_eq!(pagination.map(|page| page.total), Some(1));
    }

    #[test]
    fn subscription_status_handles_unlimited_and_missing_stats() {
        let unlimited: SubscriptionStatus = serde_json::from_str(
            r#"{"hasActiveSubscription":true,"downloadStats":{"remainingDownloads":-1}}"#,
        )
        .expect("decodes");
        assert!(
            unlimited
                .download_stats
                .is_some_and(|stats| stats.is_unlimited())
        );

        let inactive: SubscriptionStatus =
            serde_json::from_str(r#"{"hasActiveSubscription":false}"#).expect("decodes");
        assert!(!inactive.has_active_subscription);
        assert!(inactive.download_stats.is_none());
    }

    #[test]
    fn empty_session_document_is_unauthenticated_shape() {
        let session: SessionPayload = serde_json::from_str("{}").expect("decodes");
        assert_eq!(session, SessionPayload::default());

        let session: SessionPayload = serde_json::from_str(
            r#"{"user":{"id":"u1","name":"Ada","email":"ada@example.com"},"backendToken":"tok"}"#,
        )
        .expect("decodes");
        assert_eq!(session.backend_token.as_deref(), Some("tok"));
        assert_eq!(
            session.user.map(|user| user.role),
            Some(UserRole::User)
        );
    }
}
