//! Opaque user identity supplied by the auth boundary.
//!
//! The core only ever reads this identifier; it never mutates it or talks to
//! the auth provider. Callers pass it explicitly into the operations that
//! need it instead of reaching into process-wide session state.

use std::fmt;

const GUEST_USER: &str = "guest";

/// Opaque identifier for the current user, or `guest` when unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps an identifier from the auth provider; blank input falls back to
    /// the guest identity.
    pub fn new(id: impl AsRef<str>) -> Self {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Self::guest();
        }
        Self(trimmed.to_owned())
    }

    /// The identity used when no user is signed in.
    pub fn guest() -> Self {
        Self(GUEST_USER.to_owned())
    }

    pub fn is_guest(&self) -> bool {
        self.0 == GUEST_USER
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
