//! Credential storage trait and change notifications.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::credential::Credential;
use crate::SessionError;

use super::UserProfile;

/// Identifies one browser-tab context for change-notification purposes.
///
/// Storage-change notifications carry the id of the tab that performed the
/// write; a tab ignores its own writes, matching browser storage-event
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabId(String);

impl TabId {
    /// Generates a fresh random tab id.
    pub fn generate() -> TabId {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let id: String = (0..16)
            .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
            .collect();
        TabId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The persisted credential/profile pair.
///
/// Written and cleared as one unit so a reader never observes a credential
/// without its matching profile or vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub credential: Credential,
    /// Normalized profile copy, used only as a rendering fallback before
    /// validation completes. May be omitted (see
    /// [`SessionConfig::persist_profile`](crate::config::SessionConfig)).
    pub user: Option<UserProfile>,
}

/// What kind of mutation a store observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Written,
    Cleared,
}

/// A storage mutation, delivered to every watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub kind: ChangeKind,
    /// Tab that performed the write.
    pub origin: TabId,
}

/// Receives storage-change notifications.
///
/// Notifications are dispatched inline after the mutation commits, within the
/// same event-loop turn; watchers never poll.
#[async_trait]
pub trait StoreListener: Send + Sync {
    async fn on_change(&self, change: &StorageChange);
}

/// Storage for the persisted session, shared across tab contexts.
///
/// Implementations provide different backing:
/// - [`InMemoryCredentialStore`](super::InMemoryCredentialStore): in-memory,
///   shareable between managers to model multiple tabs
/// - [`FileCredentialStore`](super::FileCredentialStore): JSON file
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Reads the persisted session, if any.
    async fn load(&self) -> Result<Option<PersistedSession>, SessionError>;

    /// Writes the credential/profile pair atomically.
    async fn save(&self, session: PersistedSession, origin: &TabId) -> Result<(), SessionError>;

    /// Removes the persisted session. A no-op (with no notification) when
    /// nothing is stored.
    async fn clear(&self, origin: &TabId) -> Result<(), SessionError>;

    /// Registers a watcher for storage changes.
    async fn watch(&self, listener: Arc<dyn StoreListener>);
}
