//! Wire-level DTOs for the WebSocket event protocol and the thin HTTP
//! surface.
//!
//! Every event is a tagged JSON object (`"type": "send-message"`, ...);
//! malformed payloads fail deserialization and are answered with a typed
//! `error` event instead of crashing the handler.

pub mod event;
pub mod model;

pub use event::{ClientEvent, ServerEvent};
pub use model::{MessageDto, RoomSnapshotDto, UserSummaryDto};
