//! Store trait definition.
//!
//! Interface to the external document store holding users, rooms and
//! messages. Use cases depend on this trait; the infrastructure layer
//! provides the concrete implementation (dependency inversion).

use async_trait::async_trait;

use super::error::StoreError;
use super::message::{Message, MessageId};
use super::room::{Room, RoomId};
use super::user::{User, UserId};

/// Durable chat records: users, rooms, messages.
///
/// The realtime core only reads records for validation, writes new
/// messages, updates room last-message pointers and flips presence
/// flags. Everything else about the store (schema validation, indexes)
/// is the store's own concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User, StoreError>;

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Flip the online flag, recording `last_seen` when provided.
    async fn set_user_presence(
        &self,
        id: &UserId,
        is_online: bool,
        last_seen: Option<i64>,
    ) -> Result<(), StoreError>;

    async fn create_room(&self, room: Room) -> Result<Room, StoreError>;

    async fn find_room(&self, id: &RoomId) -> Result<Option<Room>, StoreError>;

    /// All rooms the user is a persisted participant of.
    async fn rooms_for_user(&self, user_id: &UserId) -> Result<Vec<Room>, StoreError>;

    /// The unique non-group room between two users, if it exists.
    async fn find_direct_room(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Room>, StoreError>;

    /// The bot-flagged room containing both users, if it exists.
    async fn find_bot_room(
        &self,
        user_id: &UserId,
        bot_id: &UserId,
    ) -> Result<Option<Room>, StoreError>;

    /// Set the room's last-message pointer and bump its update timestamp.
    async fn set_last_message(
        &self,
        room_id: &RoomId,
        message_id: &MessageId,
        updated_at: i64,
    ) -> Result<(), StoreError>;

    async fn create_message(&self, message: Message) -> Result<Message, StoreError>;

    async fn find_message(&self, id: &MessageId) -> Result<Option<Message>, StoreError>;
}
