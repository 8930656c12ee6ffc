//! UseCase: room membership for live connections.
//!
//! Joining is cheap and reversible; no authorization happens here. The
//! broadcast-time membership check in the relay is what actually guards
//! message flow.

use std::sync::Arc;

use crate::domain::{ChatStore, ConnectionId, EventPusher, RoomId, StoreError, UserId};

pub struct JoinRooms {
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn EventPusher>,
}

impl JoinRooms {
    pub fn new(store: Arc<dyn ChatStore>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { store, pusher }
    }

    /// Join the connection to every room the user is a persisted
    /// participant of. Returns the joined room ids.
    pub async fn join_all(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Result<Vec<RoomId>, StoreError> {
        let rooms = self.store.rooms_for_user(user_id).await?;
        let mut joined = Vec::with_capacity(rooms.len());
        for room in rooms {
            self.pusher.join_room(connection_id, room.id.clone()).await;
            joined.push(room.id);
        }
        Ok(joined)
    }

    /// Explicit single-room join. Idempotent.
    pub async fn join(&self, connection_id: &ConnectionId, room_id: RoomId) {
        self.pusher.join_room(connection_id, room_id).await;
    }

    /// Explicit single-room leave. A no-op for rooms never joined.
    pub async fn leave(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        self.pusher.leave_room(connection_id, room_id).await;
    }
}
