//! Messages and their value objects.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::room::RoomId;
use super::user::UserId;

/// Maximum message length in characters.
pub const MAX_CONTENT_LENGTH: usize = 1000;

/// Opaque unique identifier of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validation errors for [`MessageContent`].
#[derive(Debug, Error, PartialEq)]
pub enum ContentError {
    #[error("message content is required")]
    Empty,

    #[error("message cannot exceed {MAX_CONTENT_LENGTH} characters (got {0})")]
    TooLong(usize),
}

/// Message text with enforced length bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(content: String) -> Result<Self, ContentError> {
        if content.is_empty() {
            return Err(ContentError::Empty);
        }
        let len = content.chars().count();
        if len > MAX_CONTENT_LENGTH {
            return Err(ContentError::TooLong(len));
        }
        Ok(Self(content))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Kind of a message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    File,
}

/// A persisted chat message. Immutable once created.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub sender: UserId,
    pub room: RoomId,
    pub content: MessageContent,
    pub kind: MessageKind,
    /// Unix milliseconds at creation.
    pub created_at: i64,
}

impl Message {
    pub fn new(
        sender: UserId,
        room: RoomId,
        content: MessageContent,
        kind: MessageKind,
        created_at: i64,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            sender,
            room,
            content,
            kind,
            created_at,
        }
    }
}
