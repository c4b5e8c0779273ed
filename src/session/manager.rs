//! Session lifecycle owner.
//!
//! One `SessionManager` per page is the single source of truth for "who is
//! the current user, and are they authenticated". Construct it at page
//! bootstrap and pass it to consumers; there is no ambient global instance.

use std::sync::{Arc, RwLock, Weak};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::RwLock as AsyncRwLock;

use crate::backend::AuthBackend;
use crate::config::SessionConfig;
use crate::credential::Credential;
use crate::events::{Listener, SessionEvent};
use crate::validators::validate_email;
use crate::SessionError;

use super::store::{ChangeKind, CredentialStore, PersistedSession, StorageChange, StoreListener, TabId};
use super::{SessionSnapshot, SessionState, SignOutReason, UserProfile};

/// In-page signals other code may dispatch at the manager.
///
/// These correspond to the `auth:login` / `auth:logout` page events: a
/// request to re-check the stored credential, and a forced local clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// Re-validate the stored credential against the backend.
    Recheck,
    /// Drop local session state without a backend round-trip.
    ForceClear,
}

/// A partial profile change merged into the current user record.
///
/// Merging never touches the authentication flag; a role change must come
/// through a fresh validation instead.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Owns authentication state for the running page.
///
/// Cheap to clone; clones share state. The manager watches its credential
/// store and re-runs the validation/unauthenticated sequence when another
/// tab context mutates the stored credential.
pub struct SessionManager<B: AuthBackend + 'static> {
    inner: Arc<ManagerInner<B>>,
}

impl<B: AuthBackend + 'static> Clone for SessionManager<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ManagerInner<B> {
    backend: B,
    store: Arc<dyn CredentialStore>,
    config: SessionConfig,
    tab_id: TabId,
    state: RwLock<SessionState>,
    /// Set once the startup sequence has committed; guards single-flight
    /// initialization.
    started: AsyncMutex<bool>,
    listeners: AsyncRwLock<Vec<Arc<dyn Listener>>>,
}

impl<B: AuthBackend + 'static> SessionManager<B> {
    /// Creates a manager bound to a backend and a credential store, and
    /// registers it as a watcher on the store.
    pub async fn new(backend: B, store: Arc<dyn CredentialStore>, config: SessionConfig) -> Self {
        let inner = Arc::new(ManagerInner {
            backend,
            store: Arc::clone(&store),
            config,
            tab_id: TabId::generate(),
            state: RwLock::new(SessionState::Uninitialized),
            started: AsyncMutex::new(false),
            listeners: AsyncRwLock::new(Vec::new()),
        });

        store
            .watch(Arc::new(TabSync {
                inner: Arc::downgrade(&inner),
            }))
            .await;

        Self { inner }
    }

    /// The id of this tab context.
    pub fn tab_id(&self) -> &TabId {
        &self.inner.tab_id
    }

    /// An immutable view of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot()
    }

    /// Whether a validated user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    /// The current user, present iff authenticated.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.snapshot().user().cloned()
    }

    /// The persisted profile copy, if any.
    ///
    /// This is a rendering fallback for use before `initialize()` completes;
    /// it is never authoritative over a fresh validation result.
    pub async fn persisted_profile(&self) -> Option<UserProfile> {
        match self.inner.store.load().await {
            Ok(persisted) => persisted.and_then(|p| p.user),
            Err(_) => None,
        }
    }

    /// Registers a state-change listener on this manager instance.
    pub async fn subscribe(&self, listener: Arc<dyn Listener>) {
        self.inner.listeners.write().await.push(listener);
    }

    /// Runs the startup sequence at most once per page load.
    ///
    /// Reads the persisted credential; absent means routine unauthenticated
    /// startup, present means a validation round-trip. A concurrent call
    /// while validation is in flight awaits the first call's result instead
    /// of starting a second validation. Validation failure is not retried;
    /// call `initialize()` again (or `handle_signal(Recheck)`) explicitly.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_initialize", skip_all, err)
    )]
    pub async fn initialize(&self) -> Result<SessionSnapshot, SessionError> {
        let mut started = self.inner.started.lock().await;
        if *started {
            return Ok(self.snapshot());
        }

        match self.inner.store.load().await? {
            None => {
                self.inner
                    .transition(SessionState::Unauthenticated(SignOutReason::NeverSignedIn))
                    .await;
            }
            Some(persisted) => {
                self.inner.transition(SessionState::Validating).await;
                self.inner.validate_credential(persisted, true).await?;
            }
        }

        *started = true;
        log::info!(
            target: "skillport_session",
            "msg=\"session initialized\" authenticated={}",
            self.is_authenticated()
        );
        Ok(self.snapshot())
    }

    /// Exchanges credentials for an authenticated session.
    ///
    /// Expected failures (bad credentials, unreachable backend) come back as
    /// typed errors and leave any existing session state untouched.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_login", skip_all, err)
    )]
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<UserProfile, SessionError> {
        validate_email(identifier).map_err(SessionError::InvalidIdentifier)?;

        let response = match self.inner.backend.login(identifier, secret).await {
            Ok(response) => response,
            Err(err) => {
                log::warn!(
                    target: "skillport_session",
                    "msg=\"login failed\" reason=\"{err}\""
                );
                return Err(err);
            }
        };

        self.inner
            .commit_authenticated(response.credential, response.user.clone())
            .await?;

        log::info!(target: "skillport_session", "msg=\"login success\"");
        Ok(response.user)
    }

    /// Ends the session.
    ///
    /// The local clear always completes; the backend revocation is
    /// best-effort and a failure there is only logged.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_logout", skip_all)
    )]
    pub async fn logout(&self) -> Result<(), SessionError> {
        let credential = match self.inner.store.load().await {
            Ok(persisted) => persisted.map(|p| p.credential),
            Err(_) => None,
        };

        let clear_result = self.inner.store.clear(&self.inner.tab_id).await;
        self.inner
            .transition(SessionState::Unauthenticated(SignOutReason::Logout))
            .await;

        if let Some(credential) = credential {
            if let Err(err) = self.inner.backend.logout(&credential).await {
                log::warn!(
                    target: "skillport_session",
                    "msg=\"remote logout failed, local state cleared anyway\" reason=\"{err}\""
                );
            }
        }

        log::info!(target: "skillport_session", "msg=\"logout success\"");
        clear_result
    }

    /// Handles an in-page signal.
    pub async fn handle_signal(&self, signal: SessionSignal) -> Result<(), SessionError> {
        match signal {
            SessionSignal::Recheck => self.inner.revalidate().await,
            SessionSignal::ForceClear => {
                let result = self.inner.store.clear(&self.inner.tab_id).await;
                self.inner
                    .transition(SessionState::Unauthenticated(SignOutReason::External))
                    .await;
                result
            }
        }
    }

    /// Merges a profile change into the current user record.
    ///
    /// Fails with [`SessionError::NotAuthenticated`] when no user is signed
    /// in. The authentication flag is untouched; listeners receive a
    /// `ProfileUpdated` event, not an `Authenticated` one.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, SessionError> {
        let mut user = self.current_user().ok_or(SessionError::NotAuthenticated)?;

        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = update.email {
            validate_email(&email).map_err(SessionError::InvalidIdentifier)?;
            user.email = email;
        }

        if let Some(persisted) = self.inner.store.load().await? {
            self.inner
                .persist(persisted.credential, user.clone())
                .await?;
        }

        self.inner
            .set_state(SessionState::Authenticated(user.clone()));
        self.inner
            .dispatch(&SessionEvent::ProfileUpdated {
                user: user.clone(),
                at: Utc::now(),
            })
            .await;

        Ok(user)
    }
}

impl<B: AuthBackend> ManagerInner<B> {
    fn snapshot(&self) -> SessionSnapshot {
        self.state
            .read()
            .map(|state| SessionSnapshot::new(state.clone()))
            .unwrap_or_else(|_| SessionSnapshot::new(SessionState::Uninitialized))
    }

    fn set_state(&self, next: SessionState) {
        if let Ok(mut guard) = self.state.write() {
            *guard = next;
        }
    }

    /// Commits a state change and notifies listeners of actual transitions.
    ///
    /// The mutation is committed before any listener runs. Repeated
    /// unauthenticated states and identical authenticated profiles fire no
    /// event, so an external clear produces exactly one notification.
    async fn transition(&self, next: SessionState) {
        let event = {
            let Ok(mut guard) = self.state.write() else {
                return;
            };
            let event = match (&*guard, &next) {
                (SessionState::Authenticated(prev), SessionState::Authenticated(user))
                    if prev == user =>
                {
                    None
                }
                (_, SessionState::Authenticated(user)) => Some(SessionEvent::Authenticated {
                    user: user.clone(),
                    at: Utc::now(),
                }),
                (SessionState::Unauthenticated(_), SessionState::Unauthenticated(_)) => None,
                (_, SessionState::Unauthenticated(reason)) => {
                    Some(SessionEvent::Unauthenticated {
                        reason: *reason,
                        at: Utc::now(),
                    })
                }
                _ => None,
            };
            *guard = next;
            event
        };

        if let Some(event) = event {
            self.dispatch(&event).await;
        }
    }

    async fn dispatch(&self, event: &SessionEvent) {
        let listeners = self.listeners.read().await;
        for listener in listeners.iter() {
            listener.handle(event).await;
        }
    }

    async fn persist(&self, credential: Credential, user: UserProfile) -> Result<(), SessionError> {
        let user = self.config.persist_profile.then_some(user);
        self.store
            .save(PersistedSession { credential, user }, &self.tab_id)
            .await
    }

    async fn commit_authenticated(
        &self,
        credential: Credential,
        user: UserProfile,
    ) -> Result<(), SessionError> {
        self.persist(credential, user.clone()).await?;
        self.transition(SessionState::Authenticated(user)).await;
        Ok(())
    }

    /// Runs one validation round-trip for an already-loaded credential.
    ///
    /// `refresh_store` persists the normalized profile copy on success; it
    /// must be false when the validation was triggered by another tab's
    /// write, otherwise two tabs would re-notify each other forever.
    async fn validate_credential(
        &self,
        persisted: PersistedSession,
        refresh_store: bool,
    ) -> Result<(), SessionError> {
        match self.backend.validate_session(&persisted.credential).await {
            Ok(user) => {
                if refresh_store {
                    self.commit_authenticated(persisted.credential, user).await
                } else {
                    self.transition(SessionState::Authenticated(user)).await;
                    Ok(())
                }
            }
            Err(err) => {
                let reason = match &err {
                    SessionError::NetworkFailure(_) => SignOutReason::NetworkFailure,
                    _ => SignOutReason::Expired,
                };
                log::warn!(
                    target: "skillport_session",
                    "msg=\"credential validation failed\" reason=\"{err}\""
                );
                self.store.clear(&self.tab_id).await?;
                self.transition(SessionState::Unauthenticated(reason)).await;
                Ok(())
            }
        }
    }

    /// Re-runs the validation/unauthenticated sequence against the current
    /// stored credential.
    async fn revalidate(&self) -> Result<(), SessionError> {
        match self.store.load().await? {
            None => {
                self.transition(SessionState::Unauthenticated(SignOutReason::External))
                    .await;
                Ok(())
            }
            Some(persisted) => self.validate_credential(persisted, false).await,
        }
    }
}

/// Bridges storage-change notifications back into the manager.
///
/// Holds a `Weak` reference so a dropped manager does not linger in the
/// store's watcher list as live state.
struct TabSync<B> {
    inner: Weak<ManagerInner<B>>,
}

#[async_trait]
impl<B: AuthBackend + 'static> StoreListener for TabSync<B> {
    async fn on_change(&self, change: &StorageChange) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };

        // Own writes are invisible, matching browser storage-event scoping.
        if change.origin == inner.tab_id {
            return;
        }

        // Before initialize() the startup sequence will pick the slot up.
        if matches!(inner.snapshot().state(), SessionState::Uninitialized) {
            return;
        }

        match change.kind {
            ChangeKind::Cleared => {
                inner
                    .transition(SessionState::Unauthenticated(SignOutReason::External))
                    .await;
            }
            ChangeKind::Written => {
                if let Err(err) = inner.revalidate().await {
                    log::warn!(
                        target: "skillport_session",
                        "msg=\"revalidation after external write failed\" reason=\"{err}\""
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::backend::MockAuthBackend;
    use crate::session::InMemoryCredentialStore;

    struct EventCounter {
        authenticated: AtomicUsize,
        unauthenticated: AtomicUsize,
    }

    impl EventCounter {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                authenticated: AtomicUsize::new(0),
                unauthenticated: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Listener for EventCounter {
        async fn handle(&self, event: &SessionEvent) {
            match event {
                SessionEvent::Authenticated { .. } => {
                    self.authenticated.fetch_add(1, Ordering::SeqCst)
                }
                SessionEvent::Unauthenticated { .. } => {
                    self.unauthenticated.fetch_add(1, Ordering::SeqCst)
                }
                SessionEvent::ProfileUpdated { .. } => 0,
            };
        }
    }

    async fn manager_with(
        backend: MockAuthBackend,
        store: InMemoryCredentialStore,
    ) -> SessionManager<MockAuthBackend> {
        SessionManager::new(backend, Arc::new(store), SessionConfig::default()).await
    }

    #[tokio::test]
    async fn test_initialize_without_credential() {
        let manager = manager_with(MockAuthBackend::new(), InMemoryCredentialStore::new()).await;

        let snapshot = manager.initialize().await.unwrap();

        assert!(!snapshot.is_authenticated());
        assert_eq!(
            snapshot.sign_out_reason(),
            Some(SignOutReason::NeverSignedIn)
        );
    }

    #[tokio::test]
    async fn test_initialize_with_valid_credential() {
        let backend = MockAuthBackend::new();
        let store = InMemoryCredentialStore::new();
        let credential = backend.issue_credential(UserProfile::mock_with_role("mentor"));

        let tab = TabId::generate();
        store
            .save(
                PersistedSession {
                    credential,
                    user: None,
                },
                &tab,
            )
            .await
            .unwrap();

        let manager = manager_with(backend, store).await;
        let snapshot = manager.initialize().await.unwrap();

        assert!(snapshot.is_authenticated());
        assert_eq!(snapshot.user().unwrap().role, "mentor");
    }

    #[tokio::test]
    async fn test_initialize_with_rejected_credential_clears_storage() {
        let backend = MockAuthBackend::new();
        let store = InMemoryCredentialStore::new();

        let tab = TabId::generate();
        store
            .save(
                PersistedSession {
                    credential: Credential::new("stale-token"),
                    user: Some(UserProfile::mock()),
                },
                &tab,
            )
            .await
            .unwrap();

        let manager = manager_with(backend, store.clone()).await;
        let snapshot = manager.initialize().await.unwrap();

        assert!(!snapshot.is_authenticated());
        assert_eq!(snapshot.sign_out_reason(), Some(SignOutReason::Expired));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let backend = MockAuthBackend::new();
        let store = InMemoryCredentialStore::new();
        let credential = backend.issue_credential(UserProfile::mock());

        let tab = TabId::generate();
        store
            .save(
                PersistedSession {
                    credential,
                    user: None,
                },
                &tab,
            )
            .await
            .unwrap();

        let manager = manager_with(backend.clone(), store).await;

        let (first, second) = tokio::join!(manager.initialize(), manager.initialize());
        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(backend.validate_calls(), 1);

        manager.initialize().await.unwrap();
        assert_eq!(backend.validate_calls(), 1);
    }

    #[tokio::test]
    async fn test_login_populates_state_and_storage() {
        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());
        let store = InMemoryCredentialStore::new();

        let manager = manager_with(backend, store.clone()).await;
        manager.initialize().await.unwrap();

        let user = manager.login("user@example.com", "secret").await.unwrap();

        assert_eq!(user.email, "test@example.com");
        assert!(manager.is_authenticated());
        assert!(!store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_untouched() {
        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());

        let manager = manager_with(backend.clone(), InMemoryCredentialStore::new()).await;
        manager.initialize().await.unwrap();
        manager.login("user@example.com", "secret").await.unwrap();

        let result = manager.login("user@example.com", "wrong").await;
        assert!(matches!(result, Err(SessionError::CredentialInvalid(_))));
        // the previous session survives a failed re-login
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_identifier_before_network() {
        let backend = MockAuthBackend::new();
        backend.set_offline(true);

        let manager = manager_with(backend, InMemoryCredentialStore::new()).await;

        let result = manager.login("not-an-email", "secret").await;
        assert!(matches!(result, Err(SessionError::InvalidIdentifier(_))));
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());
        let store = InMemoryCredentialStore::new();

        let manager = manager_with(backend.clone(), store.clone()).await;
        manager.initialize().await.unwrap();
        manager.login("user@example.com", "secret").await.unwrap();

        backend.set_fail_logout(true);
        manager.logout().await.unwrap();

        assert!(!manager.is_authenticated());
        assert!(store.is_empty());
        assert_eq!(
            manager.snapshot().sign_out_reason(),
            Some(SignOutReason::Logout)
        );
    }

    #[tokio::test]
    async fn test_listeners_fire_after_commit() {
        // the listener must observe the already-committed state
        struct CommitAssert {
            manager: SessionManager<MockAuthBackend>,
        }

        #[async_trait]
        impl Listener for CommitAssert {
            async fn handle(&self, event: &SessionEvent) {
                assert_eq!(
                    self.manager.is_authenticated(),
                    event.is_authenticated(),
                    "listener must observe committed state"
                );
            }
        }

        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());

        let manager = manager_with(backend, InMemoryCredentialStore::new()).await;
        manager
            .subscribe(Arc::new(CommitAssert {
                manager: manager.clone(),
            }))
            .await;

        manager.initialize().await.unwrap();
        manager.login("user@example.com", "secret").await.unwrap();
        manager.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_external_clear_fires_exactly_one_notification() {
        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());
        let store = InMemoryCredentialStore::new();

        let tab_a = manager_with(backend.clone(), store.clone()).await;
        let tab_b = manager_with(backend, store.clone()).await;

        tab_a.initialize().await.unwrap();
        tab_b.initialize().await.unwrap();
        tab_a.login("user@example.com", "secret").await.unwrap();

        assert!(tab_b.is_authenticated());

        let counter = EventCounter::new();
        tab_b.subscribe(counter.clone()).await;

        // tab A signs out; tab B observes the storage change, no reload
        tab_a.logout().await.unwrap();

        assert!(!tab_b.is_authenticated());
        assert_eq!(
            tab_b.snapshot().sign_out_reason(),
            Some(SignOutReason::External)
        );
        assert_eq!(counter.unauthenticated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_clear_signal() {
        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());
        let store = InMemoryCredentialStore::new();

        let manager = manager_with(backend, store.clone()).await;
        manager.initialize().await.unwrap();
        manager.login("user@example.com", "secret").await.unwrap();

        manager
            .handle_signal(SessionSignal::ForceClear)
            .await
            .unwrap();

        assert!(!manager.is_authenticated());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_recheck_signal_drops_revoked_session() {
        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());
        let store = InMemoryCredentialStore::new();

        let manager = manager_with(backend.clone(), store.clone()).await;
        manager.initialize().await.unwrap();
        manager.login("user@example.com", "secret").await.unwrap();

        backend.revoke_all();
        manager.handle_signal(SessionSignal::Recheck).await.unwrap();

        assert!(!manager.is_authenticated());
        assert_eq!(
            manager.snapshot().sign_out_reason(),
            Some(SignOutReason::Expired)
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_update_profile_merges_without_touching_auth() {
        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());
        let store = InMemoryCredentialStore::new();

        let manager = manager_with(backend, store.clone()).await;
        manager.initialize().await.unwrap();
        manager.login("user@example.com", "secret").await.unwrap();

        let counter = EventCounter::new();
        manager.subscribe(counter.clone()).await;

        let updated = manager
            .update_profile(ProfileUpdate {
                first_name: Some("Ada".to_owned()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Ada");
        assert!(manager.is_authenticated());
        // no Authenticated/Unauthenticated event for a profile merge
        assert_eq!(counter.authenticated.load(Ordering::SeqCst), 0);
        assert_eq!(counter.unauthenticated.load(Ordering::SeqCst), 0);

        // persisted fallback copy was refreshed
        assert_eq!(
            manager.persisted_profile().await.unwrap().first_name,
            "Ada"
        );
    }

    #[tokio::test]
    async fn test_update_profile_requires_authentication() {
        let manager = manager_with(MockAuthBackend::new(), InMemoryCredentialStore::new()).await;
        manager.initialize().await.unwrap();

        let result = manager.update_profile(ProfileUpdate::default()).await;
        assert!(matches!(result, Err(SessionError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_strict_config_keeps_profile_out_of_storage() {
        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());
        let store = InMemoryCredentialStore::new();

        let manager = SessionManager::new(
            backend,
            Arc::new(store.clone()),
            SessionConfig::strict(),
        )
        .await;
        manager.initialize().await.unwrap();
        manager.login("user@example.com", "secret").await.unwrap();

        let persisted = store.load().await.unwrap().unwrap();
        assert!(persisted.user.is_none());
        assert!(manager.persisted_profile().await.is_none());
    }
}
