//! UseCase: reflect connection lifecycle as online/offline state.
//!
//! Connect marks the user online (fire-and-forget, no broadcast);
//! disconnect marks the user offline, stamps last-seen and fans a status
//! event out to every room the connection had joined. The asymmetry is
//! deliberate: other clients observe initial online state through room
//! and user list refreshes.
//!
//! The online flag is a plain boolean, not a connection count, so a user
//! with two devices goes offline when either disconnects. Kept as-is.

use std::sync::Arc;

use soro_shared::time::now_millis;

use crate::domain::{ChatStore, ConnectionId, EventPusher, User, UserId};
use crate::infrastructure::dto::ServerEvent;

pub struct TrackPresence {
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn EventPusher>,
}

impl TrackPresence {
    pub fn new(store: Arc<dyn ChatStore>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { store, pusher }
    }

    /// Mark the user online. Store failures are logged, never surfaced;
    /// connection setup does not depend on this write.
    pub async fn connected(&self, user_id: &UserId) {
        if let Err(e) = self.store.set_user_presence(user_id, true, None).await {
            tracing::warn!("failed to mark user '{}' online: {}", user_id, e);
        }
    }

    /// Unregister the connection, mark the user offline with a last-seen
    /// stamp and notify every room the connection had joined.
    pub async fn disconnected(&self, user: &User, connection_id: &ConnectionId) {
        let joined = self.pusher.unregister_connection(connection_id).await;

        let last_seen = now_millis();
        if let Err(e) = self
            .store
            .set_user_presence(&user.id, false, Some(last_seen))
            .await
        {
            tracing::warn!("failed to mark user '{}' offline: {}", user.username, e);
        }

        let event = ServerEvent::UserStatusChanged {
            user_id: user.id.to_string(),
            is_online: false,
            last_seen: Some(last_seen),
        }
        .to_json();
        for room_id in &joined {
            self.pusher
                .broadcast_room(room_id, Some(connection_id), &event)
                .await;
        }
        tracing::info!(
            "user '{}' went offline, notified {} room(s)",
            user.username,
            joined.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::pusher::WebSocketEventPusher;
    use crate::infrastructure::store::InMemoryChatStore;
    use tokio::sync::mpsc;

    async fn seed_user(store: &InMemoryChatStore, username: &str) -> User {
        store
            .create_user(User::new(
                username.to_string(),
                format!("{username}@example.com"),
                "secret".to_string(),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_connected_marks_user_online() {
        let store = Arc::new(InMemoryChatStore::new());
        let pusher = Arc::new(WebSocketEventPusher::new());
        let alice = seed_user(&store, "alice").await;

        let presence = TrackPresence::new(store.clone(), pusher);
        presence.connected(&alice.id).await;

        let stored = store.find_user(&alice.id).await.unwrap().unwrap();
        assert!(stored.is_online);
    }

    #[tokio::test]
    async fn test_disconnected_marks_offline_and_stamps_last_seen() {
        let store = Arc::new(InMemoryChatStore::new());
        let pusher = Arc::new(WebSocketEventPusher::new());
        let alice = seed_user(&store, "alice").await;

        let conn = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn.clone(), tx).await;

        let presence = TrackPresence::new(store.clone(), pusher);
        presence.connected(&alice.id).await;
        presence.disconnected(&alice, &conn).await;

        let stored = store.find_user(&alice.id).await.unwrap().unwrap();
        assert!(!stored.is_online);
        assert!(stored.last_seen.is_some());
    }

    #[tokio::test]
    async fn test_disconnected_notifies_joined_rooms_only() {
        let store = Arc::new(InMemoryChatStore::new());
        let pusher = Arc::new(WebSocketEventPusher::new());
        let alice = seed_user(&store, "alice").await;

        // alice's connection joins one room; an observer sits in both.
        let alice_conn = ConnectionId::generate();
        let (alice_tx, _alice_rx) = mpsc::unbounded_channel();
        pusher.register_connection(alice_conn.clone(), alice_tx).await;

        let observer_conn = ConnectionId::generate();
        let (observer_tx, mut observer_rx) = mpsc::unbounded_channel();
        pusher
            .register_connection(observer_conn.clone(), observer_tx)
            .await;

        let joined_room = crate::domain::RoomId::generate();
        let other_room = crate::domain::RoomId::generate();
        pusher.join_room(&alice_conn, joined_room.clone()).await;
        pusher.join_room(&observer_conn, joined_room.clone()).await;
        pusher.join_room(&observer_conn, other_room.clone()).await;

        let presence = TrackPresence::new(store, pusher);
        presence.disconnected(&alice, &alice_conn).await;

        // Exactly one status event: from the joined room, none from the
        // room alice never joined.
        let event = observer_rx.recv().await.unwrap();
        assert!(event.contains(r#""type":"user-status-changed""#));
        assert!(event.contains(&format!(r#""userId":"{}""#, alice.id)));
        assert!(event.contains(r#""isOnline":false"#));
        assert!(observer_rx.try_recv().is_err());
    }
}
