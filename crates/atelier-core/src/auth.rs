//! Authentication primitives shared across clients.
//!
//! # Design
//! - The credential store is an injected object with `get/set/clear`; there is no ambient global.
//! - A store holds at most one credential. `set` replaces, `clear` removes everything.
//! - Sessions are read-only snapshots of the external OAuth provider.

use atelier_api_models::{AuthPayload, SessionPayload, UserProfile};
use serde::{Deserialize, Serialize};

/// Backend credential used to authenticate outgoing requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Signed-in user.
    pub user: UserProfile,
    /// Backend bearer token.
    pub token: String,
}

impl Credential {
    /// Whether the token is usable for requests.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// `Authorization` header value for this credential.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl From<AuthPayload> for Credential {
    fn from(value: AuthPayload) -> Self {
        Self {
            user: value.user,
            token: value.token,
        }
    }
}

/// Holder of the single active credential.
///
/// Lifecycle: empty at first boot, populated by a login or a session sync,
/// emptied by logout or when the OAuth session ends. Implementations that
/// persist the credential must clear the whole record, never single fields.
pub trait CredentialStore {
    /// Current credential, if any.
    fn get(&self) -> Option<Credential>;
    /// Replace the active credential.
    fn set(&mut self, credential: Credential);
    /// Remove the active credential.
    fn clear(&mut self);

    /// Whether a credential with a usable token is present.
    fn is_authenticated(&self) -> bool {
        self.get().is_some_and(|credential| credential.has_token())
    }
}

/// Process-local credential store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryCredentialStore {
    credential: Option<Credential>,
}

impl MemoryCredentialStore {
    /// Create a store seeded with an optional credential.
    #[must_use]
    pub const fn new(credential: Option<Credential>) -> Self {
        Self { credential }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.credential.clone()
    }

    fn set(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    fn clear(&mut self) {
        self.credential = None;
    }
}

/// Resolution state of the OAuth session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Still resolving.
    #[default]
    Loading,
    /// Provider reports a signed-in user.
    Authenticated,
    /// Provider reports no session.
    Unauthenticated,
}

/// Snapshot of the OAuth session provider.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Resolution state.
    pub status: SessionStatus,
    /// Backend token obtained by the provider's OAuth exchange.
    pub backend_token: Option<String>,
    /// Session user.
    pub user: Option<UserProfile>,
}

impl Session {
    /// A session that has not resolved yet.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            backend_token: None,
            user: None,
        }
    }

    /// A resolved session without a user.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            backend_token: None,
            user: None,
        }
    }

    /// A resolved session for `user` carrying `backend_token`.
    #[must_use]
    pub fn authenticated(user: UserProfile, backend_token: impl Into<String>) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            backend_token: Some(backend_token.into()),
            user: Some(user),
        }
    }
}

impl From<SessionPayload> for Session {
    fn from(value: SessionPayload) -> Self {
        if value.user.is_none() {
            return Self::unauthenticated();
        }
        Self {
            status: SessionStatus::Authenticated,
            backend_token: value.backend_token.filter(|token| !token.trim().is_empty()),
            user: value.user,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use atelier_api_models::UserRole;

    pub(crate) fn user(id: &str) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            name: "Ada".to_string(),
            email: format!("{id}@example.com"),
            image: None,
            role: UserRole::User,
        }
    }

    #[test]
    fn credential_requires_non_blank_token() {
        let mut store = MemoryCredentialStore::default();
        assert!(!store.is_authenticated());
        store.set(Credential {
            user: user("u1"),
            token: "  ".to_string(),
        });
        assert!(!store.is_authenticated());
        store.set(Credential {
            user: user("u1"),
            token: "tok".to_string(),
        });
        assert!(store.is_authenticated());
        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn session_payload_maps_to_status() {
        assert_eq!(
            Session::from(SessionPayload::default()).status,
            SessionStatus::Unauthenticated
        );
        let session = Session::from(SessionPayload {
            user: Some(user("u1")),
            backend_token: Some(String::new()),
            expires: None,
        });
        assert_eq!(session.status, SessionStatus::Authenticated);
        assert_eq!(session.backend_token, None);
    }

    #[test]
    fn bearer_header_uses_token() {
        let credential = Credential {
            user: user("u1"),
            token: "abc".to_string(),
        };
        assert_eq!(credential.bearer(), "Bearer abc");
    }
}
