#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::credential::Credential;
use crate::session::UserProfile;
use crate::SessionError;

use super::{AuthBackend, LoginResponse};

struct MockAccount {
    identifier: String,
    secret: String,
    user: UserProfile,
}

#[derive(Default)]
struct MockState {
    accounts: Vec<MockAccount>,
    sessions: HashMap<String, UserProfile>,
    offline: bool,
    fail_logout: bool,
    validate_calls: u32,
}

/// In-memory backend for tests.
///
/// Register accounts, pre-issue credentials, and inject faults
/// (`set_offline`, `set_fail_logout`) to exercise the failure paths of the
/// session manager. Counts validation round-trips so idempotence can be
/// asserted.
#[derive(Clone, Default)]
pub struct MockAuthBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockAuthBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account that `login` will accept.
    pub fn register(&self, identifier: &str, secret: &str, user: UserProfile) {
        self.state.lock().unwrap().accounts.push(MockAccount {
            identifier: identifier.to_owned(),
            secret: secret.to_owned(),
            user,
        });
    }

    /// Mints a credential that `validate_session` will accept for `user`.
    pub fn issue_credential(&self, user: UserProfile) -> Credential {
        let credential = Credential::random(32);
        self.state
            .lock()
            .unwrap()
            .sessions
            .insert(credential.expose().to_owned(), user);
        credential
    }

    /// Simulates the backend being unreachable: every call fails with
    /// `NetworkFailure`.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Makes only the `logout` call fail.
    pub fn set_fail_logout(&self, fail: bool) {
        self.state.lock().unwrap().fail_logout = fail;
    }

    /// Revokes every issued credential, simulating server-side expiry.
    pub fn revoke_all(&self) {
        self.state.lock().unwrap().sessions.clear();
    }

    /// Number of `validate_session` round-trips performed.
    pub fn validate_calls(&self) -> u32 {
        self.state.lock().unwrap().validate_calls
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn validate_session(
        &self,
        credential: &Credential,
    ) -> Result<UserProfile, SessionError> {
        let mut state = self.state.lock().unwrap();
        state.validate_calls += 1;

        if state.offline {
            return Err(SessionError::NetworkFailure("connection refused".to_owned()));
        }

        state
            .sessions
            .get(credential.expose())
            .cloned()
            .ok_or_else(|| SessionError::CredentialInvalid("session expired or revoked".to_owned()))
    }

    async fn login(&self, identifier: &str, secret: &str) -> Result<LoginResponse, SessionError> {
        let mut state = self.state.lock().unwrap();

        if state.offline {
            return Err(SessionError::NetworkFailure("connection refused".to_owned()));
        }

        let user = state
            .accounts
            .iter()
            .find(|a| a.identifier == identifier && a.secret == secret)
            .map(|a| a.user.clone())
            .ok_or_else(|| SessionError::CredentialInvalid("Invalid email or password".to_owned()))?;

        let credential = Credential::random(32);
        state
            .sessions
            .insert(credential.expose().to_owned(), user.clone());

        Ok(LoginResponse { user, credential })
    }

    async fn logout(&self, credential: &Credential) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();

        if state.offline || state.fail_logout {
            return Err(SessionError::NetworkFailure("connection refused".to_owned()));
        }

        state.sessions.remove(credential.expose());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_and_validate() {
        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());

        let response = backend.login("user@example.com", "secret").await.unwrap();
        assert_eq!(response.user.email, "test@example.com");

        let user = backend.validate_session(&response.credential).await.unwrap();
        assert_eq!(user.id, response.user.id);
        assert_eq!(backend.validate_calls(), 1);
    }

    #[tokio::test]
    async fn test_bad_credentials_are_rejected() {
        let backend = MockAuthBackend::new();
        backend.register("user@example.com", "secret", UserProfile::mock());

        let result = backend.login("user@example.com", "wrong").await;
        assert!(matches!(result, Err(SessionError::CredentialInvalid(_))));

        let result = backend.login("other@example.com", "secret").await;
        assert!(matches!(result, Err(SessionError::CredentialInvalid(_))));
    }

    #[tokio::test]
    async fn test_offline_backend_fails_with_network_error() {
        let backend = MockAuthBackend::new();
        backend.set_offline(true);

        let result = backend.login("user@example.com", "secret").await;
        assert!(matches!(result, Err(SessionError::NetworkFailure(_))));

        let result = backend.validate_session(&Credential::new("tok")).await;
        assert!(matches!(result, Err(SessionError::NetworkFailure(_))));
    }

    #[tokio::test]
    async fn test_revoke_all_invalidates_issued_credentials() {
        let backend = MockAuthBackend::new();
        let credential = backend.issue_credential(UserProfile::mock());

        assert!(backend.validate_session(&credential).await.is_ok());

        backend.revoke_all();
        let result = backend.validate_session(&credential).await;
        assert!(matches!(result, Err(SessionError::CredentialInvalid(_))));
    }

    #[tokio::test]
    async fn test_logout_removes_session() {
        let backend = MockAuthBackend::new();
        let credential = backend.issue_credential(UserProfile::mock());

        backend.logout(&credential).await.unwrap();

        let result = backend.validate_session(&credential).await;
        assert!(matches!(result, Err(SessionError::CredentialInvalid(_))));
    }
}
