//! Persistence and environment helpers for the app shell.
//!
//! Writes return the storage error after logging it so callers can tell the
//! viewer their sign-in will not survive a reload.

use atelier_core::{Credential, SessionAction, StorefrontConfig};
use gloo::console;
use gloo::storage::errors::StorageError;
use gloo::storage::{LocalStorage, Storage};
use gloo::utils::window;
use serde::Serialize;
use web_sys::Url;

use crate::core::logic::derive_api_base_url;
use crate::core::store::AuthMemo;

const FALLBACK_ORIGIN: &str = "http://localhost:3000";

/// Configuration for this page's origin.
pub(crate) fn storefront_config() -> StorefrontConfig {
    StorefrontConfig::with_base_url(api_base_url())
}

pub(crate) fn load_credential(config: &StorefrontConfig) -> Option<Credential> {
    let credential = LocalStorage::get::<Credential>(config.credential_key()).ok()?;
    credential.has_token().then_some(credential)
}

pub(crate) fn load_auth_memo(config: &StorefrontConfig) -> Option<AuthMemo> {
    LocalStorage::get::<AuthMemo>(config.session_key()).ok()
}

/// Persist a credential together with the session memo it belongs to.
pub(crate) fn persist_login(
    config: &StorefrontConfig,
    credential: &Credential,
    memo: &AuthMemo,
) -> Result<(), StorageError> {
    set_storage(&config.credential_key(), credential)?;
    set_storage(&config.session_key(), memo)
}

/// Remove the whole credential record and its session memo.
pub(crate) fn clear_credential(config: &StorefrontConfig) {
    LocalStorage::delete(config.credential_key());
    LocalStorage::delete(config.session_key());
}

/// Mirror a reconciler decision and the resulting memo into LocalStorage.
pub(crate) fn persist_session_action(
    config: &StorefrontConfig,
    action: &SessionAction,
    memo: &AuthMemo,
) -> Result<(), StorageError> {
    match action {
        SessionAction::Write(credential) => persist_login(config, credential, memo),
        SessionAction::Clear => {
            clear_credential(config);
            Ok(())
        }
        SessionAction::Noop => set_storage(&config.session_key(), memo),
    }
}

fn api_base_url() -> String {
    let href = window()
        .location()
        .href()
        .unwrap_or_else(|_| FALLBACK_ORIGIN.to_string());

    match Url::new(&href) {
        Ok(url) => derive_api_base_url(&url.protocol(), &url.hostname(), &url.port()),
        Err(_) => derive_api_base_url("http:", "localhost", "3000"),
    }
}

fn set_storage<T: Serialize>(key: &str, value: T) -> Result<(), StorageError> {
    LocalStorage::set(key, value).inspect_err(|err| {
        log_storage_error("set", key, &err.to_string());
    })
}

fn log_storage_error(operation: &'static str, key: &str, detail: &str) {
    console::error!("storage operation failed", operation, key, detail);
}
