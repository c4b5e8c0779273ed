//! The canonical navigation tables.
//!
//! The source controllers each carried their own slightly different copy of
//! these paths; this is the single normalized table.

use super::Role;

/// The login entry point.
pub const LOGIN_PATH: &str = "/login";

/// The registration page.
pub const REGISTER_PATH: &str = "/register";

/// Pages only shown to signed-out visitors.
pub const AUTH_PAGES: [&str; 2] = [LOGIN_PATH, REGISTER_PATH];

/// Path prefixes that require an authenticated session.
///
/// `/user` is the legacy alias for the student area.
pub const PROTECTED_PREFIXES: [&str; 5] = ["/admin", "/mentor", "/student", "/user", "/personal"];

/// The canonical landing path for a role.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::CommunityAdmin => "/admin/dashboard",
        Role::Mentor => "/mentor/dashboard",
        Role::Student => "/student/dashboard",
        Role::Personal => "/personal/dashboard",
    }
}

/// Normalizes a navigational path for comparison.
///
/// Lowercases, strips query/fragment, and trims the trailing slash, so
/// `/Admin/Dashboard/` and `/admin/dashboard?tab=1` compare equal.
pub fn normalize_path(path: &str) -> String {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// Whether `path` equals `prefix` or sits beneath it.
///
/// `/administrator` is not under `/admin`.
pub(super) fn under_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_paths_are_protected() {
        for role in Role::ALL {
            let landing = landing_path(role);
            assert!(
                PROTECTED_PREFIXES
                    .iter()
                    .any(|prefix| under_prefix(landing, prefix)),
                "{landing} should be under a protected prefix"
            );
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/Admin/Dashboard/"), "/admin/dashboard");
        assert_eq!(normalize_path("/admin/dashboard?tab=1"), "/admin/dashboard");
        assert_eq!(normalize_path("/login#form"), "/login");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("login"), "/login");
    }

    #[test]
    fn test_under_prefix_respects_segment_boundaries() {
        assert!(under_prefix("/admin", "/admin"));
        assert!(under_prefix("/admin/users", "/admin"));
        assert!(!under_prefix("/administrator", "/admin"));
        assert!(!under_prefix("/adm", "/admin"));
    }
}
