//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, MessageContent, PusherChannel, RoomId, User},
    infrastructure::dto::{ClientEvent, ServerEvent},
    ui::state::{AppState, ConnectQuery},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Hard gate: no upgrade without a resolvable identity.
    let user = match state.authenticate.execute(query.token.as_deref()).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("rejected connection attempt: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    tracing::info!("user '{}' authenticated for WebSocket upgrade", user.username);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user)))
}

/// Spawns a task that drains the connection's channel into its socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if sender.send(Message::Text(event.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user: User) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    let connection_id = ConnectionId::generate();
    state
        .pusher
        .register_connection(connection_id.clone(), tx.clone())
        .await;

    // Online flag is fire-and-forget; connection setup never waits on
    // the store.
    {
        let presence = state.presence.clone();
        let user_id = user.id.clone();
        tokio::spawn(async move {
            presence.connected(&user_id).await;
        });
    }

    tracing::info!(
        "user '{}' connected on connection '{}'",
        user.username,
        connection_id
    );

    let mut send_task = pusher_loop(rx, sender);

    let recv_state = state.clone();
    let recv_user = user.clone();
    let recv_connection = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_client_event(&recv_state, &recv_user, &recv_connection, &tx, &text)
                        .await;
                }
                Message::Close(_) => {
                    tracing::info!("user '{}' requested close", recv_user.username);
                    break;
                }
                // Ping/pong is handled by the protocol layer.
                _ => {}
            }
        }
    });

    // If either task completes, tear down the other.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.presence.disconnected(&user, &connection_id).await;
    tracing::info!("user '{}' disconnected", user.username);
}

async fn handle_client_event(
    state: &Arc<AppState>,
    user: &User,
    connection_id: &ConnectionId,
    tx: &PusherChannel,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("malformed event from '{}': {}", user.username, e);
            send_error(tx, "Malformed event payload");
            return;
        }
    };

    match event {
        ClientEvent::JoinRooms => {
            match state.join_rooms.join_all(&user.id, connection_id).await {
                Ok(joined) => {
                    tracing::debug!("user '{}' joined {} room(s)", user.username, joined.len());
                }
                Err(e) => {
                    tracing::error!("join-rooms failed for '{}': {}", user.username, e);
                }
            }
        }
        ClientEvent::JoinRoom { room_id } => match RoomId::parse(&room_id) {
            Ok(room_id) => {
                state.join_rooms.join(connection_id, room_id.clone()).await;
                tracing::debug!("user '{}' joined room '{}'", user.username, room_id);
            }
            Err(_) => send_error(tx, "Invalid room id"),
        },
        ClientEvent::LeaveRoom { room_id } => match RoomId::parse(&room_id) {
            Ok(room_id) => {
                state.join_rooms.leave(connection_id, &room_id).await;
                tracing::debug!("user '{}' left room '{}'", user.username, room_id);
            }
            Err(_) => send_error(tx, "Invalid room id"),
        },
        ClientEvent::SendMessage {
            content,
            chat_room,
            message_type,
        } => {
            let Ok(room_id) = RoomId::parse(&chat_room) else {
                send_error(tx, "Chat room not found");
                return;
            };
            let content = match MessageContent::new(content) {
                Ok(content) => content,
                Err(e) => {
                    send_error(tx, &e.to_string());
                    return;
                }
            };
            match state
                .relay
                .execute(user, &room_id, content, message_type)
                .await
            {
                Ok(outcome) => {
                    if outcome.bot_room {
                        // Fire-and-forget; the sender never waits on the
                        // bot.
                        state.bot.schedule_reply(
                            room_id,
                            outcome.message.content.as_str().to_string(),
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!("send-message from '{}' rejected: {}", user.username, e);
                    send_error(tx, &e.to_string());
                }
            }
        }
        ClientEvent::Typing { chat_room } => {
            if let Ok(room_id) = RoomId::parse(&chat_room) {
                state.typing.typing(user, connection_id, &room_id).await;
            }
        }
        ClientEvent::StopTyping { chat_room } => {
            if let Ok(room_id) = RoomId::parse(&chat_room) {
                state.typing.stop_typing(user, connection_id, &room_id).await;
            }
        }
    }
}

/// Error events go to the originating connection only.
fn send_error(tx: &PusherChannel, message: &str) {
    let event = ServerEvent::Error {
        message: message.to_string(),
    };
    if tx.send(event.to_json()).is_err() {
        tracing::debug!("connection closed before error event could be delivered");
    }
}
