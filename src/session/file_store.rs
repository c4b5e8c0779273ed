//! File-based credential storage.
//!
//! Persists the session as a JSON file so it survives page restarts.
//! Change notifications cover watchers in the same process; cross-process
//! file watching is out of scope.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock as AsyncRwLock;

use crate::SessionError;

use super::store::{ChangeKind, CredentialStore, PersistedSession, StorageChange, StoreListener, TabId};

const SESSION_FILE: &str = "session.json";

/// File-based credential storage.
///
/// The session is stored as `session.json` in the configured directory.
///
/// # Example
///
/// ```rust,ignore
/// use skillport_session::FileCredentialStore;
///
/// let store = FileCredentialStore::new("/var/lib/skillport/session")?;
/// ```
pub struct FileCredentialStore {
    directory: PathBuf,
    listeners: Arc<AsyncRwLock<Vec<Arc<dyn StoreListener>>>>,
}

impl FileCredentialStore {
    /// Creates a new file credential store.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let dir = directory.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            SessionError::StorageError(format!("Failed to create session directory: {e}"))
        })?;
        Ok(Self {
            directory: dir,
            listeners: Arc::new(AsyncRwLock::new(Vec::new())),
        })
    }

    fn session_path(&self) -> PathBuf {
        self.directory.join(SESSION_FILE)
    }

    fn read_session(&self) -> Result<Option<PersistedSession>, SessionError> {
        let path = self.session_path();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| SessionError::StorageError(format!("Failed to read session file: {e}")))?;

        let session: PersistedSession = serde_json::from_str(&content)
            .map_err(|e| SessionError::StorageError(format!("Failed to parse session file: {e}")))?;

        Ok(Some(session))
    }

    fn write_session(&self, session: &PersistedSession) -> Result<(), SessionError> {
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| SessionError::StorageError(format!("Failed to serialize session: {e}")))?;

        std::fs::write(self.session_path(), content)
            .map_err(|e| SessionError::StorageError(format!("Failed to write session file: {e}")))?;

        Ok(())
    }

    async fn notify(&self, kind: ChangeKind, origin: &TabId) {
        let change = StorageChange {
            kind,
            origin: origin.clone(),
        };
        let listeners = self.listeners.read().await;
        for listener in listeners.iter() {
            listener.on_change(&change).await;
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
        self.read_session()
    }

    async fn save(&self, session: PersistedSession, origin: &TabId) -> Result<(), SessionError> {
        self.write_session(&session)?;
        self.notify(ChangeKind::Written, origin).await;
        Ok(())
    }

    async fn clear(&self, origin: &TabId) -> Result<(), SessionError> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(());
        }

        std::fs::remove_file(&path)
            .map_err(|e| SessionError::StorageError(format!("Failed to delete session file: {e}")))?;

        self.notify(ChangeKind::Cleared, origin).await;
        Ok(())
    }

    async fn watch(&self, listener: Arc<dyn StoreListener>) {
        self.listeners.write().await.push(listener);
    }
}
