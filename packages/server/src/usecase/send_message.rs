//! UseCase: the message relay.
//!
//! One submission walks received -> authorized -> persisted -> broadcast,
//! optionally reporting a bot trigger back to the caller. Authorization
//! and persistence failures go back to the sender only; the room-pointer
//! update and the broadcasts are best-effort.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

use soro_shared::time::now_millis;

use crate::domain::{
    ChatStore, EventPusher, Message, MessageContent, MessageKind, RoomId, RoomSnapshot,
    StoreError, User,
};
use crate::infrastructure::dto::{MessageDto, RoomSnapshotDto, ServerEvent};

/// Bound on primary-path store writes so a stalled store cannot wedge a
/// connection's handler forever.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error("Chat room not found")]
    RoomNotFound,

    #[error("You are not part of this chat room")]
    NotAParticipant,

    #[error("Failed to send message")]
    Store(#[source] StoreError),
}

/// What a successful submission produced.
pub struct SendOutcome {
    pub message: Message,
    /// Whether the target room is bot-enabled; the caller schedules the
    /// reply so the sender never waits on it.
    pub bot_room: bool,
}

pub struct RelayMessage {
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn EventPusher>,
}

impl RelayMessage {
    pub fn new(store: Arc<dyn ChatStore>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { store, pusher }
    }

    /// Run one submission through the relay.
    ///
    /// # Errors
    ///
    /// [`SendMessageError::RoomNotFound`] / [`SendMessageError::NotAParticipant`]
    /// when authorization fails, [`SendMessageError::Store`] when
    /// persistence fails or times out. In every error case nothing was
    /// broadcast and no message was recorded.
    pub async fn execute(
        &self,
        sender: &User,
        room_id: &RoomId,
        content: MessageContent,
        kind: MessageKind,
    ) -> Result<SendOutcome, SendMessageError> {
        // 1. Authorization against the persisted participant list.
        let room = self
            .store
            .find_room(room_id)
            .await
            .map_err(SendMessageError::Store)?
            .ok_or(SendMessageError::RoomNotFound)?;
        if !room.is_participant(&sender.id) {
            return Err(SendMessageError::NotAParticipant);
        }

        // 2. Persistence, bounded.
        let message = Message::new(
            sender.id.clone(),
            room_id.clone(),
            content,
            kind,
            now_millis(),
        );
        let message = timeout(STORE_TIMEOUT, self.store.create_message(message))
            .await
            .map_err(|_| SendMessageError::Store(StoreError::Timeout))?
            .map_err(SendMessageError::Store)?;

        // 3-4. Room pointer + fan-out, best-effort from here on.
        broadcast_new_message(&*self.store, &*self.pusher, sender, &message).await;

        Ok(SendOutcome {
            message,
            bot_room: room.is_bot,
        })
    }
}

/// Steps 3-4 of the relay, shared with the bot responder: advance the
/// room's last-message pointer, then emit `new-message` followed by
/// `room-updated` to every connection joined to the room, sender's own
/// connection included. Failures are logged, not surfaced.
pub(crate) async fn broadcast_new_message(
    store: &dyn ChatStore,
    pusher: &dyn EventPusher,
    sender: &User,
    message: &Message,
) {
    if let Err(e) = store
        .set_last_message(&message.room, &message.id, message.created_at)
        .await
    {
        tracing::warn!(
            "failed to update last message of room '{}': {}",
            message.room,
            e
        );
    }

    let new_message = ServerEvent::NewMessage {
        message: MessageDto::from_message(message, sender),
    };
    pusher
        .broadcast_room(&message.room, None, &new_message.to_json())
        .await;

    match build_room_snapshot(store, &message.room).await {
        Ok(Some(snapshot)) => {
            let room_updated = ServerEvent::RoomUpdated {
                room: RoomSnapshotDto::from(&snapshot),
            };
            pusher
                .broadcast_room(&message.room, None, &room_updated.to_json())
                .await;
        }
        Ok(None) => {
            tracing::warn!("room '{}' vanished before room-updated", message.room);
        }
        Err(e) => {
            tracing::warn!("failed to snapshot room '{}': {}", message.room, e);
        }
    }
}

/// Load a room and resolve its participant and last-message references.
pub(crate) async fn build_room_snapshot(
    store: &dyn ChatStore,
    room_id: &RoomId,
) -> Result<Option<RoomSnapshot>, StoreError> {
    let Some(room) = store.find_room(room_id).await? else {
        return Ok(None);
    };
    let mut participants = Vec::with_capacity(room.participants.len());
    for user_id in &room.participants {
        if let Some(user) = store.find_user(user_id).await? {
            participants.push(user);
        }
    }
    let last_message = match &room.last_message {
        Some(message_id) => store.find_message(message_id).await?,
        None => None,
    };
    Ok(Some(RoomSnapshot {
        room,
        participants,
        last_message,
    }))
}
