mod file_store;
mod manager;
mod memory_store;
mod store;

use chrono::{DateTime, Utc};
pub use file_store::FileCredentialStore;
pub use manager::{ProfileUpdate, SessionManager, SessionSignal};
pub use memory_store::InMemoryCredentialStore;
pub use store::{ChangeKind, CredentialStore, PersistedSession, StorageChange, StoreListener, TabId};
use serde::{Deserialize, Serialize};

/// The user record carried by an authenticated session.
///
/// `role` is kept as the raw wire string so a record with a role outside the
/// known set can still be carried and displayed; access decisions treat such
/// a role as granting nothing (see [`AccessPolicy`](crate::AccessPolicy)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub community_id: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Returns the user's display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the account has completed verification.
    ///
    /// Verification is a profile attribute; it does not gate authentication.
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}

#[cfg(any(test, feature = "mocks"))]
impl UserProfile {
    pub fn mock() -> Self {
        Self::mock_with_role("student")
    }

    pub fn mock_with_role(role: &str) -> Self {
        UserProfile {
            id: 1,
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: "test@example.com".to_owned(),
            role: role.to_owned(),
            community_id: Some("community-1".to_owned()),
            verified_at: None,
        }
    }
}

/// Why a session is (or became) unauthenticated.
///
/// Distinguishes the routine "never signed in" startup state from an expired
/// credential, an unreachable server, and a sign-out triggered outside this
/// tab, so the page can surface the right notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// No stored credential was found at startup. Not an error.
    NeverSignedIn,
    /// The user signed out in this tab.
    Logout,
    /// The backend rejected the stored credential.
    Expired,
    /// The backend could not be reached during validation.
    NetworkFailure,
    /// The credential was cleared outside this tab (another tab, or a
    /// forced-clear signal).
    External,
}

impl SignOutReason {
    /// A user-visible notice for this reason, if one should be shown.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SignOutReason::NeverSignedIn | SignOutReason::Logout => None,
            SignOutReason::Expired => Some("Your session has expired. Please sign in again."),
            SignOutReason::NetworkFailure => Some("Couldn't reach the server. Please try again."),
            SignOutReason::External => Some("You were signed out in another tab."),
        }
    }
}

/// The authentication state of the current tab.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// `initialize()` has not run yet.
    Uninitialized,
    /// A stored credential is being validated against the backend.
    Validating,
    /// A validated user. Holding the profile inside the variant makes
    /// "authenticated implies user present" true by construction.
    Authenticated(UserProfile),
    Unauthenticated(SignOutReason),
}

/// An immutable view of the session state at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    state: SessionState,
}

impl SessionSnapshot {
    pub fn new(state: SessionState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// The current user; present iff authenticated.
    pub fn user(&self) -> Option<&UserProfile> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn sign_out_reason(&self) -> Option<SignOutReason> {
        match &self.state {
            SessionState::Unauthenticated(reason) => Some(*reason),
            _ => None,
        }
    }
}
