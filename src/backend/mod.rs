//! Backend auth collaborator interface.
//!
//! The backend validates credentials and issues/revokes sessions; this crate
//! only consumes it. Implementations own their transport concerns, including
//! timeouts: a call that would hang must resolve to a
//! [`NetworkFailure`](crate::SessionError::NetworkFailure) instead, and the
//! session manager treats that like any other validation failure.

#[cfg(any(test, feature = "mocks"))]
mod mock;

use async_trait::async_trait;
#[cfg(any(test, feature = "mocks"))]
pub use mock::MockAuthBackend;

use crate::credential::Credential;
use crate::session::UserProfile;
use crate::SessionError;

/// A successful login response: the validated user plus a fresh credential.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub credential: Credential,
}

/// The external service validating credentials and issuing sessions.
///
/// Expected failures come back as typed [`SessionError`] values:
/// `CredentialInvalid` for a rejected credential or bad login, and
/// `NetworkFailure` for transport problems.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Validates a stored credential and returns the user it belongs to.
    async fn validate_session(&self, credential: &Credential)
        -> Result<UserProfile, SessionError>;

    /// Exchanges login credentials for a user record and a session credential.
    async fn login(&self, identifier: &str, secret: &str)
        -> Result<LoginResponse, SessionError>;

    /// Revokes the session server-side. Best-effort from the caller's
    /// perspective: local cleanup proceeds regardless of the outcome.
    async fn logout(&self, credential: &Credential) -> Result<(), SessionError>;
}
