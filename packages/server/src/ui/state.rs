//! Server state and connection query types.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::{ChatStore, EventPusher};
use crate::usecase::{
    AuthenticateConnection, BotResponder, JoinRooms, NotifyTyping, RelayMessage, TrackPresence,
};

/// Query parameters for the WebSocket handshake. The bearer token rides
/// on the upgrade request since browsers cannot set headers on
/// WebSocket connections.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// Shared application state: one Arc'd use case per core operation.
pub struct AppState {
    pub authenticate: Arc<AuthenticateConnection>,
    pub presence: Arc<TrackPresence>,
    pub join_rooms: Arc<JoinRooms>,
    pub relay: Arc<RelayMessage>,
    pub typing: Arc<NotifyTyping>,
    pub bot: Arc<BotResponder>,
    pub pusher: Arc<dyn EventPusher>,
    pub store: Arc<dyn ChatStore>,
    pub tokens: Arc<crate::infrastructure::auth::TokenService>,
}
