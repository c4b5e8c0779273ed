use chrono::{DateTime, Utc};

use crate::session::{SignOutReason, UserProfile};

/// Session state-change events.
///
/// Fired by the session manager strictly after the state mutation they
/// describe is committed: a listener reading the manager's snapshot always
/// observes the new state.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A validation or login round-trip succeeded.
    Authenticated {
        user: UserProfile,
        at: DateTime<Utc>,
    },
    /// The session ended (logout, expiry, network failure, external clear).
    Unauthenticated {
        reason: SignOutReason,
        at: DateTime<Utc>,
    },
    /// The profile was merged with an explicit update; the authentication
    /// flag did not change.
    ProfileUpdated {
        user: UserProfile,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticated { .. } => "session.authenticated",
            Self::Unauthenticated { .. } => "session.unauthenticated",
            Self::ProfileUpdated { .. } => "session.profile_updated",
        }
    }

    /// Returns the timestamp when this event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Authenticated { at, .. }
            | Self::Unauthenticated { at, .. }
            | Self::ProfileUpdated { at, .. } => *at,
        }
    }

    /// The user the session holds after this event, if any.
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated { user, .. } | Self::ProfileUpdated { user, .. } => Some(user),
            Self::Unauthenticated { .. } => None,
        }
    }

    /// Whether the session is authenticated after this event.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Unauthenticated { .. })
    }
}
