//! Access decisions over the session snapshot.

use crate::session::{SessionSnapshot, UserProfile};

use super::paths::{
    landing_path, normalize_path, under_prefix, AUTH_PAGES, LOGIN_PATH, PROTECTED_PREFIXES,
};
use super::Role;

/// The requirement string that any authenticated user satisfies.
pub const ANY_ROLE: &str = "any";

/// What `enforce` decided for the current page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnforceOutcome {
    /// Render the page; no navigation needed.
    Stay,
    /// Navigate to the given path before rendering protected content.
    Redirect(String),
}

/// Pure access/redirect decisions over `(session, resource requirement)`.
///
/// Never panics for a missing or malformed role: anything outside the known
/// set is access-denied and logged as a data-integrity anomaly so the page
/// can report it without crashing rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Whether the current session may view a resource requiring `required`.
    ///
    /// False when unauthenticated. True for the `"any"` requirement.
    /// Otherwise an explicit set-membership check over the role containment
    /// table; unknown requirement strings and unknown user roles are denied.
    pub fn has_access(&self, session: &SessionSnapshot, required: &str) -> bool {
        let Some(user) = session.user() else {
            return false;
        };

        if required == ANY_ROLE {
            return true;
        }

        let Some(required) = Role::parse(required) else {
            log::warn!(
                target: "skillport_session::policy",
                "msg=\"unknown role requirement, denying\" required=\"{required}\""
            );
            return false;
        };

        let Some(role) = Role::parse(&user.role) else {
            log::warn!(
                target: "skillport_session::policy",
                "msg=\"user carries unknown role, denying\" role=\"{}\" user_id={}",
                user.role,
                user.id
            );
            return false;
        };

        role.satisfies(required)
    }

    /// Whether a navigational path requires an authenticated session.
    ///
    /// Pure prefix classification; no network access.
    pub fn is_protected_path(&self, path: &str) -> bool {
        let path = normalize_path(path);
        PROTECTED_PREFIXES
            .iter()
            .any(|prefix| under_prefix(&path, prefix))
    }

    /// Whether a path is an auth-only page (login/register).
    pub fn is_auth_page(&self, path: &str) -> bool {
        let path = normalize_path(path);
        AUTH_PAGES.iter().any(|page| under_prefix(&path, page))
    }

    /// The canonical landing path for an authenticated user's role.
    ///
    /// `None` for a role outside the table; the caller reports that as a
    /// configuration/data error rather than redirecting anywhere.
    pub fn resolve_redirect_target(&self, user: &UserProfile) -> Option<&'static str> {
        match Role::parse(&user.role) {
            Some(role) => Some(landing_path(role)),
            None => {
                log::warn!(
                    target: "skillport_session::policy",
                    "msg=\"no landing path for unknown role\" role=\"{}\" user_id={}",
                    user.role,
                    user.id
                );
                None
            }
        }
    }

    /// The composite check run on every page load.
    ///
    /// Unauthenticated on a protected path redirects to login; authenticated
    /// on an auth-only page redirects to the role's landing path. A redirect
    /// whose target equals the current path collapses to `Stay`, so repeated
    /// enforcement never loops.
    pub fn enforce(&self, current_path: &str, session: &SessionSnapshot) -> EnforceOutcome {
        let path = normalize_path(current_path);

        if self.is_protected_path(&path) && !session.is_authenticated() {
            return redirect_unless_there(&path, LOGIN_PATH);
        }

        if self.is_auth_page(&path) && session.is_authenticated() {
            if let Some(target) = session.user().and_then(|u| self.resolve_redirect_target(u)) {
                return redirect_unless_there(&path, target);
            }
            // unknown role: nowhere canonical to send them, stay put
        }

        EnforceOutcome::Stay
    }
}

fn redirect_unless_there(current: &str, target: &str) -> EnforceOutcome {
    if current == target {
        EnforceOutcome::Stay
    } else {
        EnforceOutcome::Redirect(target.to_owned())
    }
}
