//! App-wide yewdux store slices.
//!
//! # Design
//! - Keep shared UI state in one store to avoid ad-hoc contexts.
//! - Reducers are plain functions over `&mut AppStore` so they run natively in tests;
//!   components call them inside `dispatch.reduce_mut` and act on what they return.
//! - The session reconciler lives in the auth slice, next to the credential it writes.
//! - The auth slice survives reloads as two records: the credential and an
//!   [`AuthMemo`] of the session snapshot plus sync mark it was reconciled against.
//! - The yewdux `Store` impl only exists on wasm; native builds test the reducers alone.

use std::collections::HashMap;

use atelier_api_models::LikeToggle;
use atelier_core::likes::{LikeTicket, begin_toggle, settle_toggle};
use atelier_core::{
    AccessDecision, ActionError, ActionResult, Credential, CredentialStore, Entitlements,
    LikeSnapshot, LikeState, MemoryCredentialStore, Session, SessionAction, SessionReconciler,
    Settlement, SyncMark, evaluate,
};
use serde::{Deserialize, Serialize};
#[cfg(target_arch = "wasm32")]
use yewdux::store::Store;

use crate::core::logic::design_path;

/// Global application store for shared state.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(target_arch = "wasm32", derive(Store))]
pub struct AppStore {
    /// Session, credential, and sync state.
    pub auth: AuthSlice,
    /// Per-design like state.
    pub likes: LikesSlice,
    /// Download entitlements for the signed-in viewer.
    pub access: AccessSlice,
}

/// Authentication state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthSlice {
    /// Latest snapshot of the OAuth session.
    pub session: Session,
    /// Active backend credential.
    pub credential: MemoryCredentialStore,
    /// Tracks which session token was last written to the credential.
    pub reconciler: SessionReconciler,
}

impl AuthSlice {
    /// Whether outgoing requests can be authenticated.
    #[must_use]
    pub fn signed_in(&self) -> bool {
        self.credential.is_authenticated()
    }
}

/// Session state persisted beside the credential.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthMemo {
    /// Session snapshot last reconciled.
    pub session: Session,
    /// Sync mark after that reconciliation.
    pub mark: SyncMark,
}

/// Like state keyed by design id.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LikesSlice {
    /// Optimistic state per design.
    pub by_design: HashMap<String, LikeState>,
}

/// Entitlement records feeding the access evaluator.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AccessSlice {
    /// Loaded records; `None` until the first load finishes.
    pub entitlements: Option<Entitlements>,
    /// A load is running.
    pub loading: bool,
}

/// What a component should render for a like button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LikeView {
    /// Displayed liked flag and count.
    pub snapshot: LikeSnapshot,
    /// A toggle is in flight; the control should be disabled.
    pub processing: bool,
}

/// Seed the store from persisted auth state at boot.
///
/// The memo only applies alongside a credential; without one the session
/// starts from scratch.
pub fn restore_auth(
    store: &mut AppStore,
    credential: Option<Credential>,
    memo: Option<AuthMemo>,
) {
    let memo = credential.as_ref().and(memo).unwrap_or_default();
    store.auth = AuthSlice {
        session: memo.session,
        credential: MemoryCredentialStore::new(credential),
        reconciler: SessionReconciler::resume(memo.mark),
    };
}

/// Auth state to persist after a session change or a login.
#[must_use]
pub fn auth_memo(store: &AppStore) -> AuthMemo {
    AuthMemo {
        session: store.auth.session.clone(),
        mark: store.auth.reconciler.mark().clone(),
    }
}

/// Record a new session snapshot and reconcile the credential against it.
///
/// Returns the applied action so the caller can mirror it into durable storage.
/// Entitlements are dropped whenever the credential changes hands. A poll that
/// returns the snapshot already held is not a session change and reconciles nothing.
pub fn apply_session(store: &mut AppStore, session: Session) -> SessionAction {
    if store.auth.session == session {
        return SessionAction::Noop;
    }
    store.auth.session = session;
    let auth = &mut store.auth;
    let action = auth.reconciler.observe(&auth.session, &mut auth.credential);
    if !matches!(action, SessionAction::Noop) {
        store.access = AccessSlice::default();
    }
    action
}

/// Store the credential returned by a credentials login.
pub fn login_succeeded(store: &mut AppStore, credential: Credential) {
    store.auth.credential.set(credential);
    store.access = AccessSlice::default();
}

/// Forget the credential and everything derived from it.
pub fn logout(store: &mut AppStore) {
    store.auth.credential.clear();
    store.access = AccessSlice::default();
}

/// Current like view for `design`.
#[must_use]
pub fn select_like(store: &AppStore, design: &str) -> LikeView {
    store
        .likes
        .by_design
        .get(design)
        .map(|state| LikeView {
            snapshot: *state.current(),
            processing: state.is_in_flight(),
        })
        .unwrap_or_default()
}

/// Start tracking `design` with its public like count; no-op when already tracked.
pub fn track_like(store: &mut AppStore, design: &str, count: u64) {
    store
        .likes
        .by_design
        .entry(design.to_string())
        .or_insert_with(|| {
            LikeState::new(LikeSnapshot {
                liked: false,
                count,
            })
        });
}

/// Apply the viewer's liked flag from a server check; ignored mid-toggle.
pub fn hydrate_like(store: &mut AppStore, design: &str, liked: bool) -> bool {
    let state = store.likes.by_design.entry(design.to_string()).or_default();
    let count = state.confirmed().count;
    state.refresh(LikeSnapshot { liked, count })
}

/// Start a like toggle.
///
/// # Errors
///
/// Returns [`ActionError::AuthRequired`] for signed-out viewers; the state is untouched.
/// `Ok(None)` means a toggle for `design` is already in flight.
pub fn begin_like(store: &mut AppStore, design: &str) -> ActionResult<Option<LikeTicket>> {
    if !store.auth.signed_in() {
        return Err(ActionError::auth_required(design_path(design)));
    }
    let state = store.likes.by_design.entry(design.to_string()).or_default();
    Ok(begin_toggle(state))
}

/// Settle a toggle started by [`begin_like`].
pub fn settle_like(
    store: &mut AppStore,
    design: &str,
    ticket: &LikeTicket,
    result: &ActionResult<LikeToggle>,
) -> Settlement {
    store
        .likes
        .by_design
        .get_mut(design)
        .map_or(Settlement::Discarded, |state| {
            settle_toggle(state, ticket, result)
        })
}

/// Mark an entitlement load as running.
pub fn begin_access_load(store: &mut AppStore) {
    store.access.loading = true;
}

/// Store loaded entitlements.
pub fn set_entitlements(store: &mut AppStore, entitlements: Entitlements) {
    store.access = AccessSlice {
        entitlements: Some(entitlements),
        loading: false,
    };
}

/// Access decision for `design`, or `None` while a signed-in viewer's records load.
#[must_use]
pub fn select_access(store: &AppStore, design: &str) -> Option<AccessDecision> {
    let signed_in = store.auth.signed_in();
    if !signed_in {
        return Some(evaluate(false, design, &[], None));
    }
    store
        .access
        .entitlements
        .as_ref()
        .filter(|entitlements| entitlements.signed_in)
        .map(|entitlements| entitlements.evaluate(design))
}
