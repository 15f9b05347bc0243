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
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::future_not_send)]
//! Storefront domain logic shared by the web UI and the CLI.
//!
//! Layout:
//! - `auth.rs`: credentials, sessions, and the credential store seam
//! - `session.rs`: reducer that syncs the OAuth session into the credential store
//! - `optimistic.rs`: snapshot/apply/commit-or-rollback command with an in-flight guard
//! - `likes.rs`: like toggle built on the optimistic command
//! - `access.rs`: download entitlement evaluation
//! - `api.rs`: transport-agnostic API traits
//! - `config.rs`: client configuration model
//! - `error.rs`: action error taxonomy

pub mod access;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod likes;
pub mod optimistic;
pub mod session;

pub use access::{AccessDecision, AccessReason, Entitlements, evaluate};
pub use api::{AuthApi, EntitlementsApi, LikesApi};
pub use auth::{Credential, CredentialStore, MemoryCredentialStore, Session, SessionStatus};
pub use config::StorefrontConfig;
pub use error::{ActionError, ActionResult, ConfigError};
pub use likes::{LikeController, LikeSnapshot, LikeState, ToggleOutcome};
pub use optimistic::{Optimistic, Settlement, Ticket};
pub use session::{SessionAction, SessionReconciler, SyncMark, reconcile};
