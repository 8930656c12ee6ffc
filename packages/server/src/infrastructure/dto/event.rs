//! The WebSocket event protocol.
//!
//! Event names mirror the Soro client: kebab-case `type` tag, camelCase
//! payload fields.

use serde::{Deserialize, Serialize};

use crate::domain::MessageKind;

use super::model::{MessageDto, RoomSnapshotDto};

/// Events received from clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Join every room the user is a persisted participant of.
    JoinRooms,

    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String },

    #[serde(rename_all = "camelCase")]
    LeaveRoom { room_id: String },

    #[serde(rename_all = "camelCase")]
    SendMessage {
        content: String,
        chat_room: String,
        #[serde(default)]
        message_type: MessageKind,
    },

    #[serde(rename_all = "camelCase")]
    Typing { chat_room: String },

    #[serde(rename_all = "camelCase")]
    StopTyping { chat_room: String },
}

/// Events pushed to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    NewMessage { message: MessageDto },

    RoomUpdated { room: RoomSnapshotDto },

    #[serde(rename_all = "camelCase")]
    UserStatusChanged {
        user_id: String,
        is_online: bool,
        last_seen: Option<i64>,
    },

    #[serde(rename_all = "camelCase")]
    UserTyping {
        user_id: String,
        username: String,
        chat_room: String,
    },

    #[serde(rename_all = "camelCase")]
    UserStopTyping {
        user_id: String,
        chat_room: String,
    },

    Error { message: String },
}

impl ServerEvent {
    /// Serialize for the wire. Server events contain nothing that can
    /// fail JSON serialization.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("server event serializes to JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_event_parses() {
        let raw = r#"{"type":"send-message","content":"hi","chatRoom":"room-1"}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event,
            ClientEvent::SendMessage {
                content: "hi".to_string(),
                chat_room: "room-1".to_string(),
                message_type: MessageKind::Text,
            }
        );
    }

    #[test]
    fn test_send_message_event_honors_message_type() {
        let raw =
            r#"{"type":"send-message","content":"pic","chatRoom":"r","messageType":"image"}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            event,
            ClientEvent::SendMessage {
                message_type: MessageKind::Image,
                ..
            }
        ));
    }

    #[test]
    fn test_join_rooms_event_parses_without_payload() {
        let event: ClientEvent = serde_json::from_str(r#"{"type":"join-rooms"}"#).unwrap();
        assert_eq!(event, ClientEvent::JoinRooms);
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let result = serde_json::from_str::<ClientEvent>(r#"{"type":"self-destruct"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let result = serde_json::from_str::<ClientEvent>(r#"{"type":"send-message"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_event_shape() {
        let json = ServerEvent::Error {
            message: "Chat room not found".to_string(),
        }
        .to_json();
        assert_eq!(json, r#"{"type":"error","message":"Chat room not found"}"#);
    }

    #[test]
    fn test_user_status_changed_uses_camel_case() {
        let json = ServerEvent::UserStatusChanged {
            user_id: "u1".to_string(),
            is_online: false,
            last_seen: Some(99),
        }
        .to_json();
        assert!(json.contains(r#""type":"user-status-changed""#));
        assert!(json.contains(r#""userId":"u1""#));
        assert!(json.contains(r#""isOnline":false"#));
        assert!(json.contains(r#""lastSeen":99"#));
    }
}
