//! One-directional sync from the OAuth session into the credential store.
//!
//! # Design
//! - `reconcile` is a pure reducer; `SessionReconciler` applies its output to a store.
//! - The session decides whether someone is signed in. Once synced, the store's token
//!   is the one used for requests, so a refreshed token in the store is never
//!   overwritten by a stale session carrying the already-synced token.

use serde::{Deserialize, Serialize};

use crate::auth::{Credential, CredentialStore, Session, SessionStatus};

/// Last backend token applied to the credential store.
///
/// Owned by the reconciler. Empty until a sync happens and after the session
/// becomes unauthenticated. Serializes as the bare token (or `null`) so
/// clients can carry it across restarts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMark(Option<String>);

impl SyncMark {
    /// Mark for a token that has been synced.
    #[must_use]
    pub fn synced(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Whether no sync is recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Whether `token` is the last synced token.
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        self.0.as_deref() == Some(token)
    }

    /// Synced token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Store mutation decided by [`reconcile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
    /// Write this credential to the store.
    Write(Credential),
    /// Clear the store.
    Clear,
    /// Leave the store alone.
    Noop,
}

/// Output of [`reconcile`]: the store action plus the next sync mark.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    /// Mutation to apply to the credential store.
    pub action: SessionAction,
    /// Sync mark after the action is applied.
    pub mark: SyncMark,
}

/// Decide how the credential store must change for the observed session.
#[must_use]
pub fn reconcile(current: Option<&Credential>, session: &Session, mark: &SyncMark) -> Reconciliation {
    match session.status {
        SessionStatus::Loading => Reconciliation {
            action: SessionAction::Noop,
            mark: mark.clone(),
        },
        SessionStatus::Authenticated => {
            let (Some(token), Some(user)) = (session.backend_token.as_deref(), session.user.as_ref())
            else {
                return Reconciliation {
                    action: SessionAction::Noop,
                    mark: mark.clone(),
                };
            };
            if mark.matches(token) {
                return Reconciliation {
                    action: SessionAction::Noop,
                    mark: mark.clone(),
                };
            }
            Reconciliation {
                action: SessionAction::Write(Credential {
                    user: user.clone(),
                    token: token.to_string(),
                }),
                mark: SyncMark::synced(token),
            }
        }
        SessionStatus::Unauthenticated => Reconciliation {
            action: if current.is_some() {
                SessionAction::Clear
            } else {
                SessionAction::Noop
            },
            mark: SyncMark::default(),
        },
    }
}

/// Stateful wrapper that owns the sync mark and applies reconciliations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionReconciler {
    mark: SyncMark,
}

impl SessionReconciler {
    /// Create a reconciler with an empty sync mark.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a mark recorded by an earlier run.
    #[must_use]
    pub const fn resume(mark: SyncMark) -> Self {
        Self { mark }
    }

    /// Current sync mark.
    #[must_use]
    pub const fn mark(&self) -> &SyncMark {
        &self.mark
    }

    /// Re-evaluate the session against the store and apply the outcome.
    ///
    /// Call this whenever the session or the store changes. Returns the action
    /// that was applied so callers can mirror it into durable storage.
    pub fn observe<S: CredentialStore + ?Sized>(
        &mut self,
        session: &Session,
        store: &mut S,
    ) -> SessionAction {
        let current = store.get();
        let Reconciliation { action, mark } = reconcile(current.as_ref(), session, &self.mark);
        match &action {
            SessionAction::Write(credential) => {
                tracing::debug!(user = %credential.user.id, "syncing session credential");
                store.set(credential.clone());
            }
            SessionAction::Clear => {
                tracing::debug!("session ended; clearing credential");
                store.clear();
            }
            SessionAction::Noop => {
                if session.status == SessionStatus::Authenticated
                    && session.backend_token.is_none()
                {
                    tracing::debug!("authenticated session has no backend token yet");
                }
            }
        }
        self.mark = mark;
        action
    }
}
