//! Opaque credential wrapper.
//!
//! The credential proves identity to the backend. Its contents are never
//! inspected client-side, and it must never leak into logs or error output.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque bearer credential that prevents accidental logging.
///
/// `Credential` implements `Debug` and `Display` to show `[REDACTED]` instead
/// of the actual token, so formatting a session or an error can never leak it.
///
/// # Example
///
/// ```rust
/// use skillport_session::Credential;
///
/// let credential = Credential::new("opaque-bearer-token");
///
/// // Debug output shows [REDACTED]
/// assert_eq!(format!("{:?}", credential), "Credential([REDACTED])");
///
/// // Access the actual value only when sending it to the backend
/// assert_eq!(credential.expose(), "opaque-bearer-token");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Creates a credential from any type that can be converted to a `String`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Generates a random alphanumeric credential of the given length.
    ///
    /// Real credentials are issued by the backend; this exists for mock
    /// backends and tests.
    #[must_use]
    pub fn random(length: usize) -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let token: String = (0..length)
            .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
            .collect();
        Self(token)
    }

    /// Exposes the raw token.
    ///
    /// Use this only at the point where the credential is handed to the
    /// backend transport.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the credential is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the length of the credential in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Self(token))
    }
}
