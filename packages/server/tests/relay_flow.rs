//! End-to-end flow tests over the in-memory infrastructure.
//!
//! Wires real use cases, the in-memory store and the WebSocket pusher's
//! channels together in-process, then walks the same scenarios a pair of
//! browser clients would produce. No network involved: each "client" is
//! the receiving end of its connection's channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use soro_server::domain::{
    ChatStore, ConnectionId, EventPusher, MessageContent, MessageKind, Room, RoomId, User,
};
use soro_server::infrastructure::pusher::WebSocketEventPusher;
use soro_server::infrastructure::store::InMemoryChatStore;
use soro_server::usecase::{
    BotConfig, BotResponder, JoinRooms, RelayMessage, TrackPresence,
};

struct TestApp {
    store: Arc<InMemoryChatStore>,
    pusher: Arc<WebSocketEventPusher>,
    relay: RelayMessage,
    presence: TrackPresence,
    join_rooms: JoinRooms,
    bot: Arc<BotResponder>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemoryChatStore::new());
        let pusher = Arc::new(WebSocketEventPusher::new());
        Self {
            relay: RelayMessage::new(store.clone(), pusher.clone()),
            presence: TrackPresence::new(store.clone(), pusher.clone()),
            join_rooms: JoinRooms::new(store.clone(), pusher.clone()),
            bot: Arc::new(BotResponder::new(
                store.clone(),
                pusher.clone(),
                BotConfig {
                    reply_delay: Duration::from_millis(10),
                    ..BotConfig::default()
                },
            )),
            store,
            pusher,
        }
    }

    async fn register(&self, username: &str) -> User {
        self.store
            .create_user(User::new(
                username.to_string(),
                format!("{username}@example.com"),
                "secret".to_string(),
            ))
            .await
            .unwrap()
    }

    async fn direct_room(&self, a: &User, b: &User) -> Room {
        self.store
            .create_room(
                Room::new(
                    format!("{}-{}", a.username, b.username),
                    None,
                    vec![a.id.clone(), b.id.clone()],
                    false,
                    false,
                    a.id.clone(),
                    0,
                )
                .unwrap(),
            )
            .await
            .unwrap()
    }

    /// Connect a user: register a connection and join all their rooms,
    /// as the WebSocket handler does after the auth gate.
    async fn connect(&self, user: &User) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection_id = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        self.pusher
            .register_connection(connection_id.clone(), tx)
            .await;
        self.presence.connected(&user.id).await;
        self.join_rooms
            .join_all(&user.id, &connection_id)
            .await
            .unwrap();
        (connection_id, rx)
    }
}

fn content(text: &str) -> MessageContent {
    MessageContent::new(text.to_string()).unwrap()
}

#[tokio::test]
async fn two_users_in_a_room_both_receive_the_message() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let room = app.direct_room(&alice, &bob).await;

    let (_alice_conn, mut alice_rx) = app.connect(&alice).await;
    let (_bob_conn, mut bob_rx) = app.connect(&bob).await;

    let outcome = app
        .relay
        .execute(&alice, &room.id, content("hi"), MessageKind::Text)
        .await
        .unwrap();

    // Both sockets: one new-message with content "hi" from alice, one
    // room-updated whose last message is the persisted row.
    for rx in [&mut alice_rx, &mut bob_rx] {
        let new_message = rx.recv().await.unwrap();
        assert!(new_message.contains(r#""type":"new-message""#));
        assert!(new_message.contains(r#""content":"hi""#));
        assert!(new_message.contains(&format!(r#""id":"{}""#, alice.id)));

        let room_updated = rx.recv().await.unwrap();
        assert!(room_updated.contains(r#""type":"room-updated""#));
        assert!(room_updated.contains(&format!(r#""id":"{}""#, outcome.message.id)));

        assert!(rx.try_recv().is_err());
    }

    // Exactly one persisted row, and the room points at it.
    let stored = app
        .store
        .find_message(&outcome.message.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.sender, alice.id);
    let room = app.store.find_room(&room.id).await.unwrap().unwrap();
    assert_eq!(room.last_message, Some(outcome.message.id));
}

#[tokio::test]
async fn non_participant_send_reaches_nobody() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let charlie = app.register("charlie").await;
    let room = app.direct_room(&alice, &bob).await;

    let (_bob_conn, mut bob_rx) = app.connect(&bob).await;
    let (_charlie_conn, _charlie_rx) = app.connect(&charlie).await;

    let result = app
        .relay
        .execute(&charlie, &room.id, content("hello?"), MessageKind::Text)
        .await;
    assert!(result.is_err());

    // Nothing was broadcast to the room and nothing was persisted.
    assert!(bob_rx.try_recv().is_err());
    let room = app.store.find_room(&room.id).await.unwrap().unwrap();
    assert!(room.last_message.is_none());
}

#[tokio::test]
async fn disconnect_broadcasts_status_to_joined_rooms_only() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let charlie = app.register("charlie").await;
    // bob shares a room with alice, charlie does not.
    let shared = app.direct_room(&alice, &bob).await;
    let _other = app.direct_room(&bob, &charlie).await;

    let (alice_conn, _alice_rx) = app.connect(&alice).await;
    let (_bob_conn, mut bob_rx) = app.connect(&bob).await;
    let (_charlie_conn, mut charlie_rx) = app.connect(&charlie).await;

    app.presence.disconnected(&alice, &alice_conn).await;

    let event = bob_rx.recv().await.unwrap();
    assert!(event.contains(r#""type":"user-status-changed""#));
    assert!(event.contains(&format!(r#""userId":"{}""#, alice.id)));
    assert!(event.contains(r#""isOnline":false"#));
    assert!(bob_rx.try_recv().is_err());

    // charlie shares no room with alice and hears nothing.
    assert!(charlie_rx.try_recv().is_err());

    let stored = app.store.find_user(&alice.id).await.unwrap().unwrap();
    assert!(!stored.is_online);
    assert!(stored.last_seen.is_some());

    // The shared room still exists untouched.
    assert!(app.store.find_room(&shared.id).await.unwrap().is_some());
}

#[tokio::test]
async fn bot_room_produces_exactly_one_delayed_reply() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bot_room = app.bot.ensure_bot_room(&alice.id).await.unwrap();

    let (_alice_conn, mut alice_rx) = app.connect(&alice).await;

    let outcome = app
        .relay
        .execute(&alice, &bot_room.id, content("hello"), MessageKind::Text)
        .await
        .unwrap();
    assert!(outcome.bot_room);
    app.bot.schedule_reply(
        bot_room.id.clone(),
        outcome.message.content.as_str().to_string(),
    );

    // Alice's own message first.
    let own_message = alice_rx.recv().await.unwrap();
    assert!(own_message.contains(r#""content":"hello""#));
    let _own_room_update = alice_rx.recv().await.unwrap();

    // Then, after the delay, exactly one bot reply on the greeting
    // branch.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let reply = alice_rx.recv().await.unwrap();
    assert!(reply.contains(r#""type":"new-message""#));
    assert!(reply.contains("Hey there!"));
    let reply_room_update = alice_rx.recv().await.unwrap();
    assert!(reply_room_update.contains(r#""type":"room-updated""#));
    assert!(alice_rx.try_recv().is_err());
}

#[tokio::test]
async fn join_all_covers_persisted_rooms_and_nothing_else() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let charlie = app.register("charlie").await;
    let _ab = app.direct_room(&alice, &bob).await;
    let bc = app.direct_room(&bob, &charlie).await;

    let (alice_conn, _alice_rx) = app.connect(&alice).await;

    let joined = app.pusher.joined_rooms(&alice_conn).await;
    assert_eq!(joined.len(), 1);
    assert!(!joined.contains(&bc.id));
}

#[tokio::test]
async fn explicit_join_receives_messages_without_membership() {
    // Joining carries no authorization; the relay's membership check
    // guards sending, not listening.
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let eve = app.register("eve").await;
    let room = app.direct_room(&alice, &bob).await;

    let (_alice_conn, _alice_rx) = app.connect(&alice).await;
    let (eve_conn, mut eve_rx) = app.connect(&eve).await;
    app.join_rooms.join(&eve_conn, room.id.clone()).await;

    app.relay
        .execute(&alice, &room.id, content("psst"), MessageKind::Text)
        .await
        .unwrap();

    let event = eve_rx.recv().await.unwrap();
    assert!(event.contains(r#""content":"psst""#));

    // And leaving stops delivery.
    app.join_rooms.leave(&eve_conn, &room.id).await;
    let _room_update = eve_rx.recv().await.unwrap();
    app.relay
        .execute(&alice, &room.id, content("again"), MessageKind::Text)
        .await
        .unwrap();
    assert!(eve_rx.try_recv().is_err());
}

#[tokio::test]
async fn direct_room_pair_is_unique() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    app.direct_room(&alice, &bob).await;

    let duplicate = Room::new(
        "again".to_string(),
        None,
        vec![bob.id.clone(), alice.id.clone()],
        false,
        false,
        bob.id.clone(),
        0,
    )
    .unwrap();
    assert!(app.store.create_room(duplicate).await.is_err());
}

#[tokio::test]
async fn room_id_strings_roundtrip_through_the_wire() {
    // The wire protocol carries room ids as strings; make sure the ids
    // we hand out parse back.
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let room = app.direct_room(&alice, &bob).await;

    let parsed = RoomId::parse(&room.id.to_string()).unwrap();
    assert_eq!(parsed, room.id);
}
