//! File-backed credential store.
//!
//! # Design
//! - The credential is one JSON document; clearing deletes the file.
//! - Read and parse failures are logged and treated as "no credential" so a
//!   corrupt file never blocks logging in again.
//! - Writes have fallible inherent forms (`write`, `remove`). The
//!   `CredentialStore` impl can only log, so callers that go through the trait
//!   confirm the outcome with `get` afterwards.
//! - The session sync mark lives next to the credential in `<file>.syncmark`.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use atelier_core::{Credential, CredentialStore, SyncMark};

/// Credential store persisted to a single JSON file.
#[derive(Debug, Clone)]
pub(crate) struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub(crate) const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: `$HOME/.atelier/<key>.json`.
    pub(crate) fn default_path(key: &str) -> PathBuf {
        std::env::var_os("HOME")
            .map_or_else(|| PathBuf::from("."), PathBuf::from)
            .join(".atelier")
            .join(format!("{key}.json"))
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `credential`, replacing any previous one.
    pub(crate) fn write(&self, credential: &Credential) -> std::io::Result<()> {
        let text = serde_json::to_string_pretty(credential)?;
        write_private(&self.path, &text)
    }

    /// Delete the credential file. A missing file is not an error.
    pub(crate) fn remove(&self) -> std::io::Result<()> {
        remove_if_present(&self.path)
    }

    /// Location of the session sync mark.
    pub(crate) fn mark_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("credential"), OsString::from);
        name.push(".syncmark");
        self.path.with_file_name(name)
    }

    /// Sync mark recorded by the last session import. Unreadable marks read as empty.
    pub(crate) fn load_mark(&self) -> SyncMark {
        let path = self.mark_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return SyncMark::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "sync mark read failed");
                return SyncMark::default();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "sync mark is corrupt");
            SyncMark::default()
        })
    }

    /// Record `mark`; an empty mark removes the file.
    pub(crate) fn save_mark(&self, mark: &SyncMark) -> std::io::Result<()> {
        let path = self.mark_path();
        if mark.is_empty() {
            return remove_if_present(&path);
        }
        let text = serde_json::to_string(mark)?;
        write_private(&path, &text)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<Credential> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "credential read failed");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(credential) => Some(credential),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "credential file is corrupt");
                None
            }
        }
    }

    fn set(&mut self, credential: Credential) {
        if let Err(err) = self.write(&credential) {
            tracing::warn!(path = %self.path.display(), error = %err, "credential write failed");
        }
    }

    fn clear(&mut self) {
        if let Err(err) = self.remove() {
            tracing::warn!(path = %self.path.display(), error = %err, "credential removal failed");
        }
    }
}

fn write_private(path: &Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    restrict_permissions(path)
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use atelier_api_models::{UserProfile, UserRole};

    fn credential(token: &str) -> Credential {
        Credential {
            user: UserProfile {
                id: "u1".to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                image: None,
                role: UserRole::User,
            },
            token: token.to_string(),
        }
    }

    #[test]
    fn set_get_clear_roundtrip_through_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut store = FileCredentialStore::new(dir.path().join("nested").join("cred.json"));
        assert!(store.get().is_none());

        store.set(credential("t1"));
        assert_eq!(store.get().map(|c| c.token), Some("t1".to_string()));
        assert!(store.is_authenticated());

        store.clear();
        assert!(!store.path().exists());
        store.clear();
        assert!(store.get().is_none());
        Ok(())
    }

    #[test]
    fn corrupt_file_reads_as_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cred.json");
        fs::write(&path, "{not json")?;
        let store = FileCredentialStore::new(path);
        assert!(store.get().is_none());
        Ok(())
    }

    #[test]
    fn write_under_a_regular_file_fails() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "")?;
        let mut store = FileCredentialStore::new(blocker.join("cred.json"));

        assert!(store.write(&credential("t1")).is_err());
        store.set(credential("t1"));
        assert!(store.get().is_none());
        Ok(())
    }

    #[test]
    fn sync_mark_sits_beside_credential() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileCredentialStore::new(dir.path().join("cred.json"));
        assert_eq!(store.mark_path(), dir.path().join("cred.json.syncmark"));
        assert!(store.load_mark().is_empty());

        store.save_mark(&SyncMark::synced("tok-1"))?;
        assert!(store.load_mark().matches("tok-1"));

        store.save_mark(&SyncMark::default())?;
        assert!(!store.mark_path().exists());
        assert!(store.load_mark().is_empty());
        Ok(())
    }

    #[test]
    fn default_path_uses_storage_key() {
        let path = FileCredentialStore::default_path("atelier.auth.credential");
        assert!(path.ends_with(".atelier/atelier.auth.credential.json"));
    }
}
