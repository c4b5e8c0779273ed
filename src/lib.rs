pub mod backend;
pub mod cache;
pub mod config;
pub mod credential;
pub mod events;
pub mod policy;
pub mod session;
pub mod validators;

pub use backend::AuthBackend;
pub use backend::LoginResponse;
pub use cache::ResponseCache;
pub use config::SessionConfig;
pub use credential::Credential;
pub use policy::AccessPolicy;
pub use policy::EnforceOutcome;
pub use policy::Role;
pub use session::CredentialStore;
pub use session::FileCredentialStore;
pub use session::InMemoryCredentialStore;
pub use session::PersistedSession;
pub use session::SessionManager;
pub use session::SessionSignal;
pub use session::SessionSnapshot;
pub use session::SessionState;
pub use session::SignOutReason;
pub use session::TabId;
pub use session::UserProfile;

#[cfg(any(test, feature = "mocks"))]
pub use backend::MockAuthBackend;

use std::fmt;

use validators::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    CredentialMissing,
    CredentialInvalid(String),
    NetworkFailure(String),
    InvalidIdentifier(ValidationError),
    UnknownRole(String),
    StorageError(String),
    NotAuthenticated,
}

impl std::error::Error for SessionError {}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::CredentialMissing => write!(f, "No stored credential"),
            SessionError::CredentialInvalid(reason) => {
                write!(f, "Session is no longer valid: {}", reason)
            }
            SessionError::NetworkFailure(detail) => {
                write!(f, "Could not reach the server: {}", detail)
            }
            SessionError::InvalidIdentifier(err) => write!(f, "{}", err),
            SessionError::UnknownRole(role) => write!(f, "Unknown role: {}", role),
            SessionError::StorageError(detail) => write!(f, "Storage error: {}", detail),
            SessionError::NotAuthenticated => write!(f, "No authenticated session"),
        }
    }
}
