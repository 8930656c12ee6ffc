//! Domain layer: entities, value objects and the interfaces the use cases
//! depend on.
//!
//! The concrete store and pusher implementations live in the
//! infrastructure layer (dependency inversion).

pub mod error;
pub mod message;
pub mod pusher;
pub mod room;
pub mod store;
pub mod user;

pub use error::{PushError, StoreError};
pub use message::{ContentError, Message, MessageContent, MessageId, MessageKind};
pub use pusher::{ConnectionId, EventPusher, PusherChannel};
pub use room::{Room, RoomError, RoomId, RoomSnapshot};
pub use store::ChatStore;
pub use user::{User, UserId};
