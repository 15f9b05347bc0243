//! Error types for storefront actions and configuration.

use atelier_api_models::EnvelopeError;
use thiserror::Error;

/// Failure of a user-triggered storefront action.
///
/// A server answer that contradicts an optimistic guess is not an error; see
/// [`crate::optimistic::Settlement::Reconciled`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The action needs a signed-in user.
    #[error("login required")]
    AuthRequired {
        /// Path to return to after login.
        return_to: String,
    },
    /// The request did not complete.
    #[error("network request failed: {detail}")]
    NetworkFailure {
        /// Transport diagnostic.
        detail: String,
    },
    /// The server answered with a rejection or an unusable envelope.
    #[error("server rejected the request: {message}")]
    ServerRejected {
        /// Message suitable for a notification.
        message: String,
    },
}

impl ActionError {
    /// Build an [`ActionError::AuthRequired`] for the given return path.
    #[must_use]
    pub fn auth_required(return_to: impl Into<String>) -> Self {
        Self::AuthRequired {
            return_to: return_to.into(),
        }
    }

    /// Build an [`ActionError::NetworkFailure`] from any displayable error.
    #[must_use]
    pub fn network(detail: impl ToString) -> Self {
        Self::NetworkFailure {
            detail: detail.to_string(),
        }
    }

    /// Login URL the caller should redirect to, for [`ActionError::AuthRequired`].
    #[must_use]
    pub fn login_redirect(&self, login_path: &str) -> Option<String> {
        match self {
            Self::AuthRequired { return_to } => Some(format!(
                "{login_path}?callbackUrl={}",
                urlencoding::encode(return_to)
            )),
            Self::NetworkFailure { .. } | Self::ServerRejected { .. } => None,
        }
    }

    /// Text for a transient user notification.
    #[must_use]
    pub fn notification(&self) -> String {
        match self {
            Self::AuthRequired { .. } => "Please login to continue".to_string(),
            Self::NetworkFailure { .. } => "Network error, please try again".to_string(),
            Self::ServerRejected { message } => message.clone(),
        }
    }
}

impl From<EnvelopeError> for ActionError {
    fn from(value: EnvelopeError) -> Self {
        match value {
            EnvelopeError::Rejected { message } | EnvelopeError::MissingData { message } => {
                Self::ServerRejected { message }
            }
            EnvelopeError::Malformed { detail } => Self::ServerRejected {
                message: format!("unexpected response: {detail}"),
            },
        }
    }
}

/// Convenience alias for action results.
pub type ActionResult<T> = Result<T, ActionError>;

/// Configuration validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}
