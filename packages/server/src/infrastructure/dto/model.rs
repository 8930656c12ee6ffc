//! Serializable views of domain entities.

use serde::{Deserialize, Serialize};

use crate::domain::{Message, MessageKind, RoomSnapshot, User};

/// Public view of a user, as embedded in messages and room snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_online: bool,
    pub last_seen: Option<i64>,
}

impl From<&User> for UserSummaryDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            is_online: user.is_online,
            last_seen: user.last_seen,
        }
    }
}

/// Full message record, as broadcast in `new-message` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub sender: UserSummaryDto,
    pub chat_room: String,
    pub content: String,
    pub message_type: MessageKind,
    pub created_at: i64,
}

impl MessageDto {
    /// Build the wire record with the sender resolved.
    pub fn from_message(message: &Message, sender: &User) -> Self {
        Self {
            id: message.id.to_string(),
            sender: UserSummaryDto::from(sender),
            chat_room: message.room.to_string(),
            content: message.content.as_str().to_string(),
            message_type: message.kind,
            created_at: message.created_at,
        }
    }
}

/// Full room snapshot, as broadcast in `room-updated` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshotDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub participants: Vec<UserSummaryDto>,
    pub is_group: bool,
    pub is_bot: bool,
    pub created_by: String,
    pub last_message: Option<MessageDto>,
    pub updated_at: i64,
}

impl From<&RoomSnapshot> for RoomSnapshotDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        let last_message = snapshot.last_message.as_ref().and_then(|message| {
            // The sender sits in the participant list for any room the
            // message was accepted into; a miss means the store lost the
            // user record, so the pointer is omitted from the snapshot.
            snapshot
                .participants
                .iter()
                .find(|u| u.id == message.sender)
                .map(|sender| MessageDto::from_message(message, sender))
        });
        Self {
            id: snapshot.room.id.to_string(),
            name: snapshot.room.name.clone(),
            description: snapshot.room.description.clone(),
            participants: snapshot.participants.iter().map(UserSummaryDto::from).collect(),
            is_group: snapshot.room.is_group,
            is_bot: snapshot.room.is_bot,
            created_by: snapshot.room.created_by.to_string(),
            last_message,
            updated_at: snapshot.room.updated_at,
        }
    }
}
