//! In-memory credential storage.
//!
//! Suitable for tests and for modeling several tab contexts sharing one
//! same-origin storage area: clone the store into each
//! [`SessionManager`](super::SessionManager) and every mutation is observed
//! by the other managers' watchers.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::RwLock as AsyncRwLock;

use crate::SessionError;

use super::store::{ChangeKind, CredentialStore, PersistedSession, StorageChange, StoreListener, TabId};

/// In-memory credential storage.
///
/// Holds the persisted session under a `RwLock` so the credential/profile
/// pair is written atomically from a reader's perspective.
#[derive(Clone)]
pub struct InMemoryCredentialStore {
    slot: Arc<RwLock<Option<PersistedSession>>>,
    listeners: Arc<AsyncRwLock<Vec<Arc<dyn StoreListener>>>>,
}

impl InMemoryCredentialStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            listeners: Arc::new(AsyncRwLock::new(Vec::new())),
        }
    }

    /// Returns true if no session is stored.
    pub fn is_empty(&self) -> bool {
        self.slot.read().map(|guard| guard.is_none()).unwrap_or(true)
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

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
        self.slot
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| SessionError::StorageError("Lock poisoned".to_owned()))
    }

    async fn save(&self, session: PersistedSession, origin: &TabId) -> Result<(), SessionError> {
        {
            let mut guard = self
                .slot
                .write()
                .map_err(|_| SessionError::StorageError("Lock poisoned".to_owned()))?;
            *guard = Some(session);
        }

        self.notify(ChangeKind::Written, origin).await;
        Ok(())
    }

    async fn clear(&self, origin: &TabId) -> Result<(), SessionError> {
        let removed = {
            let mut guard = self
                .slot
                .write()
                .map_err(|_| SessionError::StorageError("Lock poisoned".to_owned()))?;
            guard.take().is_some()
        };

        // Removing an absent key fires no storage event in a browser either.
        if removed {
            self.notify(ChangeKind::Cleared, origin).await;
        }
        Ok(())
    }

    async fn watch(&self, listener: Arc<dyn StoreListener>) {
        self.listeners.write().await.push(listener);
    }
}
