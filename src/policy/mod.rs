//! Role-based access decisions and redirect policy.
//!
//! The role containment table and the role-to-path table live here, in one
//! place, reviewed together. Controllers must never re-implement either.

mod access;
mod paths;

pub use access::{AccessPolicy, EnforceOutcome, ANY_ROLE};
pub use paths::{landing_path, normalize_path, LOGIN_PATH, REGISTER_PATH};

/// The closed set of user roles.
///
/// There is no numeric privilege order; each role maps to the explicit set
/// of roles it satisfies via [`Role::contains`]. A role string outside this
/// set parses to `None` and grants no access, including to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    CommunityAdmin,
    Mentor,
    Student,
    Personal,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::CommunityAdmin,
        Role::Mentor,
        Role::Student,
        Role::Personal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::CommunityAdmin => "community-admin",
            Role::Mentor => "mentor",
            Role::Student => "student",
            Role::Personal => "personal",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "community-admin" => Some(Role::CommunityAdmin),
            "mentor" => Some(Role::Mentor),
            "student" => Some(Role::Student),
            "personal" => Some(Role::Personal),
            _ => None,
        }
    }

    /// The set of role requirements this role satisfies.
    ///
    /// An explicit membership table, not an arithmetic comparison.
    pub fn contains(&self) -> &'static [Role] {
        match self {
            Role::CommunityAdmin => &[
                Role::CommunityAdmin,
                Role::Mentor,
                Role::Student,
                Role::Personal,
            ],
            Role::Mentor => &[Role::Mentor, Role::Student, Role::Personal],
            Role::Student => &[Role::Student, Role::Personal],
            Role::Personal => &[Role::Personal],
        }
    }

    /// Whether this role meets the given requirement.
    pub fn satisfies(&self, required: Role) -> bool {
        self.contains().contains(&required)
    }
}
