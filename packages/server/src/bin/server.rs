//! Soro realtime chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin soro-server
//! cargo run --bin soro-server -- --host 0.0.0.0 --port 3000
//! ```
//!
//! Environment:
//! - `SORO_JWT_SECRET`: token signing secret (insecure fallback if unset)
//! - `SORO_BOT_EMAIL` / `SORO_BOT_NAME`: bot identity overrides

use std::sync::Arc;

use clap::Parser;

use soro_server::{
    infrastructure::{
        auth::TokenService, pusher::WebSocketEventPusher, store::InMemoryChatStore,
    },
    ui::{AppState, Server},
    usecase::{
        AuthenticateConnection, BotConfig, BotResponder, JoinRooms, NotifyTyping, RelayMessage,
        TrackPresence,
    },
};
use soro_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "soro-server")]
#[command(about = "Realtime chat server with rooms, presence and a bot responder", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

fn bot_config_from_env() -> BotConfig {
    let mut config = BotConfig::default();
    if let Ok(email) = std::env::var("SORO_BOT_EMAIL") {
        if !email.is_empty() {
            config.email = email;
        }
    }
    if let Ok(name) = std::env::var("SORO_BOT_NAME") {
        if !name.is_empty() {
            config.name = name;
        }
    }
    config
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Store
    // 2. EventPusher
    // 3. TokenService
    // 4. UseCases
    // 5. AppState
    // 6. Server

    // 1. Create the store (in-memory stand-in for the document database)
    let store = Arc::new(InMemoryChatStore::new());

    // 2. Create the EventPusher (WebSocket implementation)
    let pusher = Arc::new(WebSocketEventPusher::new());

    // 3. Token service, secret from the environment
    let tokens = Arc::new(TokenService::from_env());

    // 4. Create UseCases
    let authenticate = Arc::new(AuthenticateConnection::new(store.clone(), tokens.clone()));
    let presence = Arc::new(TrackPresence::new(store.clone(), pusher.clone()));
    let join_rooms = Arc::new(JoinRooms::new(store.clone(), pusher.clone()));
    let relay = Arc::new(RelayMessage::new(store.clone(), pusher.clone()));
    let typing = Arc::new(NotifyTyping::new(pusher.clone()));
    let bot = Arc::new(BotResponder::new(
        store.clone(),
        pusher.clone(),
        bot_config_from_env(),
    ));

    // 5. AppState
    let state = Arc::new(AppState {
        authenticate,
        presence,
        join_rooms,
        relay,
        typing,
        bot,
        pusher,
        store,
        tokens,
    });

    // 6. Run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
