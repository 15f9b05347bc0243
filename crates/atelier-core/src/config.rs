//! Client configuration shared by the UI and the CLI.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default backend API root.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/api";
/// Default namespace prefix for persisted client state.
pub const DEFAULT_STORAGE_NAMESPACE: &str = "atelier";
/// Default page size for the purchase lookup feeding access checks.
pub const DEFAULT_PURCHASES_LIMIT: u32 = 100;
/// Default login route used for auth redirects.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

const MAX_PURCHASES_LIMIT: u32 = 1_000;

/// Storefront client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Backend API root, without a trailing slash.
    pub api_base_url: String,
    /// Prefix for persisted keys.
    pub storage_namespace: String,
    /// Page size for `GET /purchases/mine`.
    pub purchases_limit: u32,
    /// Route that hosts the login form.
    pub login_path: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_namespace: DEFAULT_STORAGE_NAMESPACE.to_string(),
            purchases_limit: DEFAULT_PURCHASES_LIMIT,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Config pointing at `api_base_url` with defaults elsewhere.
    #[must_use]
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Storage key for the persisted credential.
    #[must_use]
    pub fn credential_key(&self) -> String {
        format!("{}.auth.credential", self.storage_namespace)
    }

    /// Storage key for the session snapshot reconciled against the credential.
    #[must_use]
    pub fn session_key(&self) -> String {
        format!("{}.auth.session", self.storage_namespace)
    }

    /// Absolute URL for an API path such as `/likes/{id}/check`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Validate field values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for an empty or non-HTTP base URL,
    /// an empty namespace, an out-of-range purchase limit, or a relative login path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://") || base.starts_with('/')) {
            return Err(ConfigError::InvalidField {
                field: "api_base_url",
                value: self.api_base_url.clone(),
                reason: "must be an http(s) URL or an absolute path",
            });
        }
        if self.storage_namespace.trim().is_empty() || self.storage_namespace.contains(char::is_whitespace)
        {
            return Err(ConfigError::InvalidField {
                field: "storage_namespace",
                value: self.storage_namespace.clone(),
                reason: "must be a non-empty token without whitespace",
            });
        }
        if self.purchases_limit == 0 || self.purchases_limit > MAX_PURCHASES_LIMIT {
            return Err(ConfigError::InvalidField {
                field: "purchases_limit",
                value: self.purchases_limit.to_string(),
                reason: "must be between 1 and 1000",
            });
        }
        if !self.login_path.starts_with('/') {
            return Err(ConfigError::InvalidField {
                field: "login_path",
                value: self.login_path.clone(),
                reason: "must be an absolute path",
            });
        }
        Ok(())
    }
}
