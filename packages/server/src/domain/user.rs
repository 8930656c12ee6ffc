//! User identity.

use std::fmt;

use uuid::Uuid;

/// Opaque unique identifier of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user.
///
/// `is_online` and `last_seen` are mutated exclusively by the presence
/// tracking path in response to connection lifecycle events, never by
/// message handling.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Opaque credential. Hashing is owned by the out-of-scope HTTP auth
    /// stack; the core only needs equality on login.
    pub credential: String,
    pub is_online: bool,
    /// Unix milliseconds of the last disconnect, if any.
    pub last_seen: Option<i64>,
}

impl User {
    pub fn new(username: String, email: String, credential: String) -> Self {
        Self {
            id: UserId::generate(),
            username,
            email,
            credential,
            is_online: false,
            last_seen: None,
        }
    }
}
