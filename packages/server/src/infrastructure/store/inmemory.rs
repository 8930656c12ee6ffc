//! In-memory implementation of [`ChatStore`].
//!
//! Stands in for the external document database: same operations, same
//! invariants, process-local lifetime. Each collection sits behind its
//! own `tokio::sync::Mutex` since handlers for different connections
//! touch the store concurrently.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatStore, Message, MessageId, Room, RoomId, StoreError, User, UserId,
};

#[derive(Default)]
pub struct InMemoryChatStore {
    users: Mutex<HashMap<UserId, User>>,
    rooms: Mutex<HashMap<RoomId, Room>>,
    messages: Mutex<HashMap<MessageId, Message>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Whether two rooms would be the same direct conversation: non-group,
/// non-bot, same unordered participant pair. Bot rooms are looked up by
/// their own flag and are exempt from the pair-uniqueness rule.
fn same_direct_pair(room: &Room, a: &UserId, b: &UserId) -> bool {
    !room.is_group
        && !room.is_bot
        && room.participants.len() == 2
        && room.is_participant(a)
        && room.is_participant(b)
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Constraint(format!(
                "email '{}' already exists",
                user.email
            )));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn set_user_presence(
        &self,
        id: &UserId,
        is_online: bool,
        last_seen: Option<i64>,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| StoreError::Constraint(format!("user '{id}' not found")))?;
        user.is_online = is_online;
        if last_seen.is_some() {
            user.last_seen = last_seen;
        }
        Ok(())
    }

    async fn create_room(&self, room: Room) -> Result<Room, StoreError> {
        let mut rooms = self.rooms.lock().await;
        // Direct-room uniqueness: at most one non-group room per user pair.
        if !room.is_group && !room.is_bot && room.participants.len() == 2 {
            let (a, b) = (&room.participants[0], &room.participants[1]);
            if rooms.values().any(|r| same_direct_pair(r, a, b)) {
                return Err(StoreError::Constraint(
                    "direct chat room for this pair already exists".to_string(),
                ));
            }
        }
        rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn find_room(&self, id: &RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.rooms.lock().await.get(id).cloned())
    }

    async fn rooms_for_user(&self, user_id: &UserId) -> Result<Vec<Room>, StoreError> {
        Ok(self
            .rooms
            .lock()
            .await
            .values()
            .filter(|r| r.is_participant(user_id))
            .cloned()
            .collect())
    }

    async fn find_direct_room(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Room>, StoreError> {
        Ok(self
            .rooms
            .lock()
            .await
            .values()
            .find(|r| same_direct_pair(r, a, b))
            .cloned())
    }

    async fn find_bot_room(
        &self,
        user_id: &UserId,
        bot_id: &UserId,
    ) -> Result<Option<Room>, StoreError> {
        Ok(self
            .rooms
            .lock()
            .await
            .values()
            .find(|r| r.is_bot && r.is_participant(user_id) && r.is_participant(bot_id))
            .cloned())
    }

    async fn set_last_message(
        &self,
        room_id: &RoomId,
        message_id: &MessageId,
        updated_at: i64,
    ) -> Result<(), StoreError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| StoreError::Constraint(format!("room '{room_id}' not found")))?;
        room.last_message = Some(message_id.clone());
        room.updated_at = updated_at;
        Ok(())
    }

    async fn create_message(&self, message: Message) -> Result<Message, StoreError> {
        self.messages
            .lock()
            .await
            .insert(message.id.clone(), message.clone());
        Ok(message)
    }

    async fn find_message(&self, id: &MessageId) -> Result<Option<Message>, StoreError> {
        Ok(self.messages.lock().await.get(id).cloned())
    }
}
