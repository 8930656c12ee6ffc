//! Chat rooms.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use super::message::{Message, MessageId};
use super::user::{User, UserId};

/// Maximum room name length in characters.
pub const MAX_NAME_LENGTH: usize = 50;

/// Minimum number of participants in any room.
pub const MIN_PARTICIPANTS: usize = 2;

/// Opaque unique identifier of a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(Uuid);

impl RoomId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validation errors for [`Room`].
#[derive(Debug, Error, PartialEq)]
pub enum RoomError {
    #[error("chat room name is required")]
    EmptyName,

    #[error("chat room name cannot exceed {MAX_NAME_LENGTH} characters")]
    NameTooLong,

    #[error("chat room must have at least {MIN_PARTICIPANTS} participants")]
    NotEnoughParticipants,
}

/// A conversation scope: group or direct, optionally bot-enabled.
///
/// The participant list is the persisted membership used for send
/// authorization; it is distinct from the set of live connections joined
/// to the room at the pusher level.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub description: Option<String>,
    pub participants: Vec<UserId>,
    pub is_group: bool,
    pub is_bot: bool,
    pub created_by: UserId,
    pub last_message: Option<MessageId>,
    /// Unix milliseconds, bumped whenever the last message changes.
    pub updated_at: i64,
}

impl Room {
    /// Create a room, enforcing the name bounds and the two-participant
    /// minimum.
    pub fn new(
        name: String,
        description: Option<String>,
        participants: Vec<UserId>,
        is_group: bool,
        is_bot: bool,
        created_by: UserId,
        created_at: i64,
    ) -> Result<Self, RoomError> {
        if name.trim().is_empty() {
            return Err(RoomError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(RoomError::NameTooLong);
        }
        if participants.len() < MIN_PARTICIPANTS {
            return Err(RoomError::NotEnoughParticipants);
        }
        Ok(Self {
            id: RoomId::generate(),
            name,
            description,
            participants,
            is_group,
            is_bot,
            created_by,
            last_message: None,
            updated_at: created_at,
        })
    }

    /// Whether the user is a persisted participant of this room.
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.participants.contains(user_id)
    }
}

/// A room with its references resolved, as broadcast in `room-updated`
/// events.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub room: Room,
    pub participants: Vec<User>,
    pub last_message: Option<Message>,
}
