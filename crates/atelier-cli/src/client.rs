//! Shared HTTP client, storefront API implementation, and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use atelier_api_models::{
    ApiEnvelope, AuthPayload, LikeCheck, LikeToggle, LoginRequest, Pagination, Purchase,
    SubscriptionStatus, UserProfile,
};
use atelier_core::{
    ActionError, ActionResult, AuthApi, Credential, CredentialStore, EntitlementsApi, LikesApi,
    StorefrontConfig,
};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::credentials::FileCredentialStore;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ActionError> for CliError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::AuthRequired { .. } => {
                Self::validation("login required (run `atelier login` first)")
            }
            ActionError::NetworkFailure { detail } => {
                Self::failure(anyhow!("request failed: {detail}"))
            }
            ActionError::ServerRejected { message } => Self::failure(anyhow!(message)),
        }
    }
}

/// Build the HTTP client shared by every command.
pub(crate) fn build_client(timeout_secs: u64, trace_id: &str) -> CliResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(trace_id)
        .map_err(|_| CliError::failure(anyhow!("trace identifier contains invalid characters")))?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(default_headers)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) config: StorefrontConfig,
    pub(crate) credential_file: PathBuf,
}

impl AppContext {
    /// Store backing the persisted credential.
    pub(crate) fn credential_store(&self) -> FileCredentialStore {
        FileCredentialStore::new(self.credential_file.clone())
    }

    /// API handle without a bearer token.
    pub(crate) fn anonymous_api(&self) -> HttpApi {
        HttpApi::new(self.client.clone(), self.config.clone(), None)
    }

    /// API handle carrying the stored credential, when one exists.
    pub(crate) fn api(&self) -> (HttpApi, Option<Credential>) {
        let credential = self.credential_store().get();
        let token = credential
            .as_ref()
            .filter(|credential| credential.has_token())
            .map(|credential| credential.token.clone());
        (
            HttpApi::new(self.client.clone(), self.config.clone(), token),
            credential,
        )
    }
}

/// reqwest-backed implementation of the storefront API traits.
#[derive(Clone)]
pub(crate) struct HttpApi {
    client: Client,
    config: StorefrontConfig,
    token: Option<String>,
}

impl HttpApi {
    pub(crate) const fn new(client: Client, config: StorefrontConfig, token: Option<String>) -> Self {
        Self {
            client,
            config,
            token,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> ActionResult<T> {
        Ok(self.exchange(request, path).await?.into_data()?)
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> ActionResult<ApiEnvelope<T>> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(ActionError::network)?;
        let status = response.status();
        let body = response.text().await.map_err(ActionError::network)?;
        tracing::debug!(%status, path, "storefront response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ActionError::auth_required(path));
        }
        match ApiEnvelope::<T>::from_json_str(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ActionError::ServerRejected {
                message: format!("request to {path} failed with status {status}"),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Purchases together with the page metadata the API attaches to them.
    pub(crate) async fn purchases_page(
        &self,
        limit: u32,
    ) -> ActionResult<(Vec<Purchase>, Option<Pagination>)> {
        let path = "/purchases/mine";
        let request = self.get(path).query(&[("limit", limit)]);
        Ok(self.exchange(request, path).await?.into_page()?)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.config.endpoint(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.config.endpoint(path))
    }
}

#[async_trait(?Send)]
impl LikesApi for HttpApi {
    async fn toggle_like(&self, design_id: &str) -> ActionResult<LikeToggle> {
        let path = like_path(design_id, "toggle");
        self.send(self.post(&path), &path).await
    }

    async fn check_like(&self, design_id: &str) -> ActionResult<LikeCheck> {
        let path = like_path(design_id, "check");
        self.send(self.get(&path), &path).await
    }
}

#[async_trait(?Send)]
impl EntitlementsApi for HttpApi {
    async fn my_purchases(&self, limit: u32) -> ActionResult<Vec<Purchase>> {
        self.purchases_page(limit)
            .await
            .map(|(purchases, _)| purchases)
    }

    async fn subscription_status(&self) -> ActionResult<SubscriptionStatus> {
        let path = "/subscription/status";
        self.send(self.get(path), path).await
    }
}

#[async_trait(?Send)]
impl AuthApi for HttpApi {
    async fn login(&self, request: &LoginRequest) -> ActionResult<AuthPayload> {
        let path = "/auth/login";
        self.send(self.post(path).json(request), path).await
    }

    async fn current_user(&self) -> ActionResult<UserProfile> {
        let path = "/auth/me";
        self.send(self.get(path), path).await
    }
}

fn like_path(design_id: &str, action: &str) -> String {
    format!("/likes/{}/{action}", urlencoding::encode(design_id))
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_api_url(input: &str) -> Result<String, String> {
    let url = input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("invalid URL '{input}': expected http or https"));
    }
    Ok(input.trim().trim_end_matches('/').to_string())
}
