//! Use case layer: one use case per core operation of the realtime
//! subsystem. Each depends only on the domain traits.

pub mod authenticate;
pub mod bot;
pub mod join_rooms;
pub mod presence;
pub mod send_message;
pub mod typing;

pub use authenticate::{AuthError, AuthenticateConnection};
pub use bot::{BotConfig, BotResponder};
pub use join_rooms::JoinRooms;
pub use presence::TrackPresence;
pub use send_message::{RelayMessage, SendMessageError, SendOutcome};
pub use typing::NotifyTyping;
