//! WebSocket implementation of [`EventPusher`].
//!
//! Owns two pieces of runtime state:
//!
//! - the connection registry: connection id to the `UnboundedSender`
//!   feeding that socket's outbound task;
//! - the room membership index: room id to joined connections and the
//!   reverse map, so disconnects can report which rooms to notify.
//!
//! Joins, leaves and broadcasts race across connections, so everything
//! sits behind a single `tokio::sync::Mutex`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, EventPusher, PushError, PusherChannel, RoomId};

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, PusherChannel>,
    room_members: HashMap<RoomId, HashSet<ConnectionId>>,
    connection_rooms: HashMap<ConnectionId, HashSet<RoomId>>,
}

#[derive(Default)]
pub struct WebSocketEventPusher {
    registry: Mutex<Registry>,
}

impl WebSocketEventPusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventPusher for WebSocketEventPusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut registry = self.registry.lock().await;
        registry.connections.insert(connection_id.clone(), sender);
        tracing::debug!("connection '{}' registered", connection_id);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let mut registry = self.registry.lock().await;
        registry.connections.remove(connection_id);
        let joined: Vec<RoomId> = registry
            .connection_rooms
            .remove(connection_id)
            .map(|rooms| rooms.into_iter().collect())
            .unwrap_or_default();
        for room_id in &joined {
            if let Some(members) = registry.room_members.get_mut(room_id) {
                members.remove(connection_id);
                if members.is_empty() {
                    registry.room_members.remove(room_id);
                }
            }
        }
        tracing::debug!(
            "connection '{}' unregistered from {} room(s)",
            connection_id,
            joined.len()
        );
        joined
    }

    async fn join_room(&self, connection_id: &ConnectionId, room_id: RoomId) {
        let mut registry = self.registry.lock().await;
        registry
            .room_members
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id.clone());
        registry
            .connection_rooms
            .entry(connection_id.clone())
            .or_default()
            .insert(room_id);
    }

    async fn leave_room(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        let mut registry = self.registry.lock().await;
        if let Some(members) = registry.room_members.get_mut(room_id) {
            members.remove(connection_id);
            if members.is_empty() {
                registry.room_members.remove(room_id);
            }
        }
        if let Some(rooms) = registry.connection_rooms.get_mut(connection_id) {
            rooms.remove(room_id);
        }
    }

    async fn joined_rooms(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let registry = self.registry.lock().await;
        registry
            .connection_rooms
            .get(connection_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), PushError> {
        let registry = self.registry.lock().await;
        let sender = registry
            .connections
            .get(connection_id)
            .ok_or_else(|| PushError::ConnectionNotFound(connection_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| PushError::PushFailed(e.to_string()))
    }

    async fn broadcast_room(
        &self,
        room_id: &RoomId,
        exclude: Option<&ConnectionId>,
        content: &str,
    ) {
        let registry = self.registry.lock().await;
        let Some(members) = registry.room_members.get(room_id) else {
            return;
        };
        for member in members {
            if Some(member) == exclude {
                continue;
            }
            match registry.connections.get(member) {
                Some(sender) => {
                    // Broadcast tolerates individual delivery failures.
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!("failed to push event to connection '{}': {}", member, e);
                    }
                }
                None => {
                    tracing::warn!("connection '{}' joined room but has no channel", member);
                }
            }
        }
    }
}
