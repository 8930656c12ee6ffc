//! UseCase: typing indicators.
//!
//! Ephemeral, never persisted, never delivered back to the sender.
//! Debouncing is the sending client's job; every event received is
//! forwarded as-is.

use std::sync::Arc;

use crate::domain::{ConnectionId, EventPusher, RoomId, User};
use crate::infrastructure::dto::ServerEvent;

pub struct NotifyTyping {
    pusher: Arc<dyn EventPusher>,
}

impl NotifyTyping {
    pub fn new(pusher: Arc<dyn EventPusher>) -> Self {
        Self { pusher }
    }

    pub async fn typing(&self, user: &User, connection_id: &ConnectionId, room_id: &RoomId) {
        let event = ServerEvent::UserTyping {
            user_id: user.id.to_string(),
            username: user.username.clone(),
            chat_room: room_id.to_string(),
        };
        self.pusher
            .broadcast_room(room_id, Some(connection_id), &event.to_json())
            .await;
    }

    pub async fn stop_typing(&self, user: &User, connection_id: &ConnectionId, room_id: &RoomId) {
        let event = ServerEvent::UserStopTyping {
            user_id: user.id.to_string(),
            chat_room: room_id.to_string(),
        };
        self.pusher
            .broadcast_room(room_id, Some(connection_id), &event.to_json())
            .await;
    }
}
