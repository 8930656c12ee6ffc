//! Soro realtime chat server library.
//!
//! Connection-authenticated WebSocket fan-out over persisted rooms:
//! message relay, presence, typing indicators and a scripted bot
//! responder.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
