//! Event pusher trait definition.
//!
//! The seam between the realtime core and the transport: use cases hand
//! serialized events to an [`EventPusher`], which owns the live
//! connections and the per-room membership index. The WebSocket
//! implementation lives in the infrastructure layer.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::error::PushError;
use super::room::RoomId;

/// Channel used to push serialized events to one connection's socket task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Identifier of one live connection.
///
/// Distinct from a user id: the same user may hold several connections.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Connection registry and room-scoped event delivery.
///
/// Joins, leaves and broadcasts race across connections, so
/// implementations must be safe to share behind an `Arc`.
#[async_trait]
pub trait EventPusher: Send + Sync {
    /// Register a new connection and its outbound channel.
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Remove a connection, returning the rooms it had joined.
    async fn unregister_connection(&self, connection_id: &ConnectionId) -> Vec<RoomId>;

    /// Join a connection to a room. Idempotent.
    async fn join_room(&self, connection_id: &ConnectionId, room_id: RoomId);

    /// Remove a connection from a room. Leaving a room that was never
    /// joined is a no-op.
    async fn leave_room(&self, connection_id: &ConnectionId, room_id: &RoomId);

    /// Rooms the connection is currently joined to.
    async fn joined_rooms(&self, connection_id: &ConnectionId) -> Vec<RoomId>;

    /// Push an event to a single connection.
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), PushError>;

    /// Push an event to every connection joined to the room, optionally
    /// excluding one. Individual delivery failures are tolerated.
    async fn broadcast_room(
        &self,
        room_id: &RoomId,
        exclude: Option<&ConnectionId>,
        content: &str,
    );
}
