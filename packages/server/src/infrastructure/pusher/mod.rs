//! Event delivery implementations.
//!
//! Currently only the WebSocket implementation of `EventPusher`.

pub mod websocket;

pub use websocket::WebSocketEventPusher;
