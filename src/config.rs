//! Configuration types for the session core.
//!
//! # Example
//!
//! ```rust
//! use skillport_session::config::{SessionConfig, CacheConfig};
//! use chrono::Duration;
//!
//! // Use defaults
//! let config = SessionConfig::default();
//!
//! // Or customize
//! let config = SessionConfig {
//!     cache: CacheConfig {
//!         default_ttl: Duration::minutes(2),
//!     },
//!     ..Default::default()
//! };
//! ```

use chrono::Duration;

/// Main configuration struct for the session core.
///
/// Use `SessionConfig::default()` for sensible production defaults.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Whether a normalized copy of the user profile is persisted next to
    /// the credential.
    ///
    /// The persisted copy is only a rendering fallback before validation
    /// completes; it is never treated as authoritative. Disable to keep
    /// profile data out of client storage.
    ///
    /// Default: true
    pub persist_profile: bool,

    /// Response cache settings.
    pub cache: CacheConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persist_profile: true,
            cache: CacheConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration suitable for development/testing.
    ///
    /// Uses a short cache TTL so stale data surfaces quickly.
    pub fn development() -> Self {
        Self {
            persist_profile: true,
            cache: CacheConfig {
                default_ttl: Duration::seconds(30),
            },
        }
    }

    /// Creates a configuration with stricter settings.
    ///
    /// Keeps profile data out of persistent storage and shortens the cache.
    pub fn strict() -> Self {
        Self {
            persist_profile: false,
            cache: CacheConfig {
                default_ttl: Duration::minutes(1),
            },
        }
    }
}

/// Configuration for the response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long cached backend responses stay readable.
    ///
    /// Default: 5 minutes
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::minutes(5),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.default_ttl <= Duration::zero() {
            return Err("default_ttl must be positive");
        }
        Ok(())
    }
}
