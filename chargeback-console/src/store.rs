//! Token Store - Persistence layer for the session credential
//!
//! Durable key/value persistence of the session credential and its declared
//! expiry. The persisted key names (`token`, `username`, `tokenExpires`) are
//! a compatibility contract with existing sessions and must not change.

use crate::{ConsoleError, ConsoleResult};
use chargeback_core::Session;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Persisted representation of a session.
///
/// `tokenExpires` is a stringified epoch-seconds value, matching the legacy
/// client state.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    token: String,
    username: String,
    #[serde(rename = "tokenExpires")]
    token_expires: String,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            username: session.username.clone(),
            token_expires: session.expires_epoch().to_string(),
        }
    }
}

impl PersistedSession {
    /// Rebuild a session; `None` if the stored expiry is not parseable or
    /// not representable as a timestamp
    fn into_session(self) -> Option<Session> {
        let expires = self.token_expires.parse::<i64>().ok()?;
        Session::from_epoch_seconds(self.token, self.username, expires)
    }
}

/// Durable client-side persistence of the session credential.
///
/// `load` must not fail on absence; writes are synchronous from the caller's
/// perspective. The store is a single-writer resource scoped to one client
/// context, so no locking beyond interior mutability is required.
pub trait TokenStore: Send + Sync {
    /// Persist the session
    fn save(&self, session: &Session) -> ConsoleResult<()>;

    /// Load the persisted session, if any was ever saved
    fn load(&self) -> ConsoleResult<Option<Session>>;

    /// Remove any persisted session
    fn clear(&self) -> ConsoleResult<()>;
}

/// File-backed token store
///
/// Persists a single JSON document under the state directory, durable across
/// process restarts within the same client context.
pub struct FileTokenStore {
    session_file: PathBuf,
}

impl FileTokenStore {
    const FILE_NAME: &'static str = "session.json";

    /// Create a store rooted at the given state directory, creating the
    /// directory if needed.
    pub fn new<P: AsRef<Path>>(state_dir: P) -> ConsoleResult<Self> {
        let state_dir = state_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&state_dir).map_err(ConsoleError::Io)?;

        info!("Token store initialized at: {}", state_dir.display());

        Ok(Self {
            session_file: state_dir.join(Self::FILE_NAME),
        })
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, session: &Session) -> ConsoleResult<()> {
        let persisted = PersistedSession::from(session);
        let json_data =
            serde_json::to_string_pretty(&persisted).map_err(ConsoleError::Serialization)?;

        std::fs::write(&self.session_file, json_data).map_err(ConsoleError::Io)?;

        debug!(
            "Saved session for {} to {}",
            session.username,
            self.session_file.display()
        );
        Ok(())
    }

    fn load(&self) -> ConsoleResult<Option<Session>> {
        if !self.session_file.exists() {
            return Ok(None);
        }

        let json_data = std::fs::read_to_string(&self.session_file).map_err(ConsoleError::Io)?;

        let session = serde_json::from_str::<PersistedSession>(&json_data)
            .ok()
            .and_then(PersistedSession::into_session);

        match session {
            Some(session) => {
                debug!(
                    "Loaded session for {} from {}",
                    session.username,
                    self.session_file.display()
                );
                Ok(Some(session))
            }
            None => {
                // A corrupt entry would re-fail on every check; treat it the
                // same as an expired one and clear it.
                warn!(
                    "Discarding unreadable session file: {}",
                    self.session_file.display()
                );
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn clear(&self) -> ConsoleResult<()> {
        if self.session_file.exists() {
            std::fs::remove_file(&self.session_file).map_err(ConsoleError::Io)?;
            debug!("Cleared session file: {}", self.session_file.display());
        }
        Ok(())
    }
}

/// In-memory token store for tests and embedded use
#[derive(Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<Session>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing session
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, session: &Session) -> ConsoleResult<()> {
        *self
            .session
            .lock()
            .map_err(|_| ConsoleError::store("token store lock poisoned"))? = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> ConsoleResult<Option<Session>> {
        Ok(self
            .session
            .lock()
            .map_err(|_| ConsoleError::store("token store lock poisoned"))?
            .clone())
    }

    fn clear(&self) -> ConsoleResult<()> {
        *self
            .session
            .lock()
            .map_err(|_| ConsoleError::store("token store lock poisoned"))? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample_session() -> Session {
        Session::new(
            "t1".to_string(),
            "alice".to_string(),
            Utc::now() + Duration::hours(1),
        )
    }

    #[test]
    fn load_returns_none_when_nothing_was_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_load_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();

        let session = sample_session();
        store.save(&session).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token, "t1");
        assert_eq!(loaded.username, "alice");
        // Sub-second precision is lost in the epoch representation
        assert_eq!(loaded.expires_epoch(), session.expires_epoch());

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn persisted_document_uses_contract_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();

        let session =
            Session::from_epoch_seconds("t1".into(), "alice".into(), 1_700_000_000).unwrap();
        store.save(&session).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["token"], "t1");
        assert_eq!(value["username"], "alice");
        assert_eq!(value["tokenExpires"], "1700000000");
    }

    #[test]
    fn corrupt_session_file_is_cleared_and_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();

        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json at all").unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn unparseable_expiry_is_treated_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();

        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"token":"t1","username":"alice","tokenExpires":"soon"}"#,
        )
        .unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn unrepresentable_expiry_is_treated_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path()).unwrap();

        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"token":"t1","username":"alice","tokenExpires":"9223372036854775807"}"#,
        )
        .unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().unwrap(), None);

        let session = sample_session();
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
