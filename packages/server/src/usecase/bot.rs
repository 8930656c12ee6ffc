//! UseCase: the scripted bot responder.
//!
//! The bot is an ordinary user record, lazily created on first need and
//! cached for the life of the process. Replies are one-shot delayed
//! tasks: once scheduled they fire regardless of later disconnects or
//! room changes, and every failure in the bot path is logged and
//! swallowed.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::OnceCell;
use uuid::Uuid;

use soro_shared::time::now_millis;

use crate::domain::{
    ChatStore, EventPusher, Message, MessageContent, MessageKind, Room, RoomId, StoreError,
    User, UserId,
};

use super::send_message::broadcast_new_message;

/// Delay between a triggering user message and the bot's reply.
pub const REPLY_DELAY: Duration = Duration::from_millis(800);

const GREETING_REPLY: &str =
    "Hey there! Great to meet you. Ready to explore what Soro can do?";
const HELP_REPLY: &str = "I can keep you company while you test this UI. \
     Try sending a few messages to see the real-time updates!";
const THANKS_REPLY: &str = "Anytime! Let me know if you want to try anything else.";
const FAREWELL_REPLY: &str = "Bye for now! I'll be right here if you need me again.";

const FILLER_REPLIES: [&str; 4] = [
    "That's cool! Tell me more.",
    "Love where this is going - keep typing!",
    "I'm just a friendly bot, but I'm great at conversation practice.",
    "This chat UI is shaping up nicely, don't you think?",
];

/// Identity and timing of the bot, env-overridable in the binary.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub email: String,
    pub name: String,
    pub reply_delay: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            email: "soro-bot@soro.app".to_string(),
            name: "Soro Bot".to_string(),
            reply_delay: REPLY_DELAY,
        }
    }
}

pub struct BotResponder {
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn EventPusher>,
    config: BotConfig,
    cached: OnceCell<User>,
}

impl BotResponder {
    pub fn new(store: Arc<dyn ChatStore>, pusher: Arc<dyn EventPusher>, config: BotConfig) -> Self {
        Self {
            store,
            pusher,
            config,
            cached: OnceCell::new(),
        }
    }

    /// The bot user, created on first need and cached for the process
    /// lifetime.
    pub async fn bot_user(&self) -> Result<User, StoreError> {
        self.cached
            .get_or_try_init(|| async {
                if let Some(bot) = self.store.find_user_by_email(&self.config.email).await? {
                    return Ok(bot);
                }
                // Random opaque credential; nobody logs in as the bot.
                let credential = Uuid::new_v4().simple().to_string();
                let bot = self
                    .store
                    .create_user(User::new(
                        self.config.name.clone(),
                        self.config.email.clone(),
                        credential,
                    ))
                    .await?;
                tracing::info!("created bot user '{}'", bot.username);
                Ok(bot)
            })
            .await
            .cloned()
    }

    /// Make sure the user has a bot-enabled direct room, creating it with
    /// a welcome message if absent. Called on registration and login.
    pub async fn ensure_bot_room(&self, user_id: &UserId) -> Result<Room, StoreError> {
        let bot = self.bot_user().await?;
        if let Some(room) = self.store.find_bot_room(user_id, &bot.id).await? {
            return Ok(room);
        }

        let now = now_millis();
        let room = Room::new(
            self.config.name.clone(),
            Some(format!("Chat with {}", self.config.name)),
            vec![user_id.clone(), bot.id.clone()],
            false,
            true,
            bot.id.clone(),
            now,
        )
        .map_err(|e| StoreError::Constraint(e.to_string()))?;
        let mut room = self.store.create_room(room).await?;

        let welcome = MessageContent::new(format!(
            "Hi there! I'm {}. Ask me anything or just say hi to see how the chat works.",
            self.config.name
        ))
        .map_err(|e| StoreError::Constraint(e.to_string()))?;
        let welcome = self
            .store
            .create_message(Message::new(
                bot.id.clone(),
                room.id.clone(),
                welcome,
                MessageKind::Text,
                now,
            ))
            .await?;
        self.store
            .set_last_message(&room.id, &welcome.id, now)
            .await?;
        room.last_message = Some(welcome.id);
        room.updated_at = now;

        tracing::info!("created bot room '{}' for user '{}'", room.id, user_id);
        Ok(room)
    }

    /// Schedule the delayed reply to a user message in a bot room.
    ///
    /// One-shot and uncancellable: disconnects or room deletion before
    /// the timer fires do not stop the reply from being persisted and
    /// broadcast to whoever is still joined.
    pub fn schedule_reply(self: &Arc<Self>, room_id: RoomId, trigger: String) {
        let responder = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(responder.config.reply_delay).await;
            if let Err(e) = responder.deliver_reply(&room_id, &trigger).await {
                tracing::error!("bot reply in room '{}' failed: {}", room_id, e);
            }
        });
    }

    async fn deliver_reply(&self, room_id: &RoomId, trigger: &str) -> Result<(), StoreError> {
        let bot = self.bot_user().await?;
        let content = MessageContent::new(generate_reply(trigger))
            .map_err(|e| StoreError::Constraint(e.to_string()))?;
        let message = self
            .store
            .create_message(Message::new(
                bot.id.clone(),
                room_id.clone(),
                content,
                MessageKind::Text,
                now_millis(),
            ))
            .await?;
        broadcast_new_message(&*self.store, &*self.pusher, &bot, &message).await;
        Ok(())
    }
}

/// Keyword-matched reply text. Deterministic for the scripted phrases,
/// uniformly random from the filler pool otherwise.
pub fn generate_reply(user_message: &str) -> String {
    let normalized = user_message.to_lowercase();

    if normalized.contains("hello") || normalized.contains("hi") {
        return GREETING_REPLY.to_string();
    }
    if normalized.contains("help") || normalized.contains("what can you do") {
        return HELP_REPLY.to_string();
    }
    if normalized.contains("thanks") || normalized.contains("thank you") {
        return THANKS_REPLY.to_string();
    }
    if normalized.contains("bye") || normalized.contains("goodbye") {
        return FAREWELL_REPLY.to_string();
    }

    let index = rand::rng().random_range(0..FILLER_REPLIES.len());
    FILLER_REPLIES[index].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionId;
    use crate::infrastructure::pusher::WebSocketEventPusher;
    use crate::infrastructure::store::InMemoryChatStore;
    use tokio::sync::mpsc;

    fn responder_with(delay: Duration) -> (Arc<BotResponder>, Arc<InMemoryChatStore>, Arc<WebSocketEventPusher>) {
        let store = Arc::new(InMemoryChatStore::new());
        let pusher = Arc::new(WebSocketEventPusher::new());
        let responder = Arc::new(BotResponder::new(
            store.clone(),
            pusher.clone(),
            BotConfig {
                reply_delay: delay,
                ..BotConfig::default()
            },
        ));
        (responder, store, pusher)
    }

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

    #[test]
    fn test_generate_reply_greeting_is_deterministic() {
        assert_eq!(generate_reply("hello"), GREETING_REPLY);
        assert_eq!(generate_reply("HELLO there"), GREETING_REPLY);
        assert_eq!(generate_reply("hi bot"), GREETING_REPLY);
    }

    #[test]
    fn test_generate_reply_keyword_branches() {
        assert_eq!(generate_reply("can you help me?"), HELP_REPLY);
        assert_eq!(generate_reply("what can you do"), HELP_REPLY);
        assert_eq!(generate_reply("ok thanks!"), THANKS_REPLY);
        assert_eq!(generate_reply("goodbye"), FAREWELL_REPLY);
    }

    #[test]
    fn test_generate_reply_falls_back_to_filler_pool() {
        // Input free of every keyword, including the substring "hi".
        let reply = generate_reply("zebra quantum zzz");
        assert!(FILLER_REPLIES.contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn test_bot_user_is_created_once_and_cached() {
        let (responder, store, _pusher) = responder_with(Duration::from_millis(1));

        let first = responder.bot_user().await.unwrap();
        let second = responder.bot_user().await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.email, "soro-bot@soro.app");

        let stored = store
            .find_user_by_email("soro-bot@soro.app")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, first.id);
    }

    #[tokio::test]
    async fn test_bot_user_reuses_existing_record() {
        let (responder, store, _pusher) = responder_with(Duration::from_millis(1));
        let existing = store
            .create_user(User::new(
                "Soro Bot".to_string(),
                "soro-bot@soro.app".to_string(),
                "preexisting".to_string(),
            ))
            .await
            .unwrap();

        let bot = responder.bot_user().await.unwrap();
        assert_eq!(bot.id, existing.id);
    }

    #[tokio::test]
    async fn test_ensure_bot_room_creates_room_with_welcome() {
        let (responder, store, _pusher) = responder_with(Duration::from_millis(1));
        let alice = seed_user(&store, "alice").await;

        let room = responder.ensure_bot_room(&alice.id).await.unwrap();
        assert!(room.is_bot);
        assert!(!room.is_group);
        assert!(room.is_participant(&alice.id));
        assert_eq!(room.participants.len(), 2);

        let welcome_id = room.last_message.clone().unwrap();
        let welcome = store.find_message(&welcome_id).await.unwrap().unwrap();
        assert!(welcome.content.as_str().starts_with("Hi there! I'm Soro Bot."));
    }

    #[tokio::test]
    async fn test_ensure_bot_room_is_idempotent() {
        let (responder, store, _pusher) = responder_with(Duration::from_millis(1));
        let alice = seed_user(&store, "alice").await;

        let first = responder.ensure_bot_room(&alice.id).await.unwrap();
        let second = responder.ensure_bot_room(&alice.id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.rooms_for_user(&alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scheduled_reply_is_persisted_and_broadcast_once() {
        let (responder, store, pusher) = responder_with(Duration::from_millis(10));
        let alice = seed_user(&store, "alice").await;
        let room = responder.ensure_bot_room(&alice.id).await.unwrap();

        let conn = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn.clone(), tx).await;
        pusher.join_room(&conn, room.id.clone()).await;

        responder.schedule_reply(room.id.clone(), "hello".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;

        let new_message = rx.recv().await.unwrap();
        assert!(new_message.contains(r#""type":"new-message""#));
        assert!(new_message.contains(GREETING_REPLY));

        let room_updated = rx.recv().await.unwrap();
        assert!(room_updated.contains(r#""type":"room-updated""#));

        // Exactly one reply.
        assert!(rx.try_recv().is_err());

        // The room pointer advanced past the welcome message.
        let updated = store.find_room(&room.id).await.unwrap().unwrap();
        assert_ne!(updated.last_message, room.last_message);
    }

    #[tokio::test]
    async fn test_reply_fires_even_after_listener_disconnects() {
        // Uncancelled one-shot: the reply is persisted regardless.
        let (responder, store, pusher) = responder_with(Duration::from_millis(10));
        let alice = seed_user(&store, "alice").await;
        let room = responder.ensure_bot_room(&alice.id).await.unwrap();
        let welcome_id = room.last_message.clone();

        let conn = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn.clone(), tx).await;
        pusher.join_room(&conn, room.id.clone()).await;
        pusher.unregister_connection(&conn).await;

        responder.schedule_reply(room.id.clone(), "anyone there?".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;

        let updated = store.find_room(&room.id).await.unwrap().unwrap();
        assert_ne!(updated.last_message, welcome_id);
    }
}
