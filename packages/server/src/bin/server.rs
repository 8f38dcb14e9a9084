//! Multi-room WebSocket chat server.
//!
//! Clients authenticate with a JWT at connect time, join rooms, exchange
//! messages in real time and see ephemeral typing indicators.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin irori-server
//! cargo run --bin irori-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use irori_server::{
    domain::{Identity, Room, RoomId, Timestamp, UserId, Username},
    infrastructure::{
        auth::{issue_token, JwtIdentityResolver},
        broadcast::BroadcastRouter,
        connection::ConnectionManager,
        message_pusher::WebSocketMessagePusher,
        presence::TypingTracker,
        repository::{InMemoryMessageStore, InMemoryRoomRegistry},
    },
    ui::Server,
    usecase::{
        ConnectSessionUseCase, DeleteMessageUseCase, DisconnectSessionUseCase, EditMessageUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, SendMessageUseCase, TypingSignalUseCase,
    },
};
use irori_shared::{
    logger::setup_logger,
    time::{SystemClock, get_utc_timestamp},
};

/// Token lifetime for the seeded demo users
const DEMO_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Parser, Debug)]
#[command(name = "irori-server")]
#[command(about = "Multi-room WebSocket chat server with typing presence", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// HS256 secret for verifying connection tokens
    #[arg(long, env = "IRORI_JWT_SECRET", default_value = "dev-secret-change-me")]
    jwt_secret: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repositories (Room Registry / Message Store) + Identity Resolver
    // 2. ConnectionManager / MessagePusher / TypingTracker / BroadcastRouter
    // 3. UseCases
    // 4. Server

    // 1. Create repositories and the identity resolver, seeded with demo data
    //    (account and room CRUD belong to the REST collaborator, not to the
    //    real-time core)
    let demo_users = vec![demo_identity("alice"), demo_identity("bob")];
    for identity in &demo_users {
        match issue_token(&args.jwt_secret, &identity.user_id, DEMO_TOKEN_TTL_SECS) {
            Ok(token) => tracing::info!(
                "Seeded user '{}' (token: {})",
                identity.username.as_str(),
                token
            ),
            Err(e) => tracing::warn!(
                "Failed to issue demo token for '{}': {}",
                identity.username.as_str(),
                e
            ),
        }
    }
    let identity_resolver = Arc::new(JwtIdentityResolver::new(&args.jwt_secret, demo_users.clone()));

    let room_registry = Arc::new(InMemoryRoomRegistry::new());
    let general = Room::new(
        RoomId::new("general".to_string()).expect("Failed to create RoomId"),
        "general".to_string(),
        demo_users[0].user_id.clone(),
        Timestamp::new(get_utc_timestamp()),
    );
    tracing::info!("Room '{}' created!", general.room_id.as_str());
    room_registry.add_room(general).await;

    let message_store = Arc::new(InMemoryMessageStore::new(Arc::new(SystemClock)));

    // 2. Create the in-process shared state components
    let connections = Arc::new(ConnectionManager::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let typing = Arc::new(TypingTracker::new());
    let router = Arc::new(BroadcastRouter::new(
        connections.clone(),
        message_pusher.clone(),
    ));

    // 3. Create UseCases
    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        identity_resolver,
        connections.clone(),
        message_pusher.clone(),
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
        connections.clone(),
        message_pusher.clone(),
        typing.clone(),
        router.clone(),
    ));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        room_registry.clone(),
        connections.clone(),
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(connections.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        room_registry.clone(),
        message_store.clone(),
        connections.clone(),
        router.clone(),
    ));
    let edit_message_usecase = Arc::new(EditMessageUseCase::new(
        message_store.clone(),
        connections.clone(),
        router.clone(),
    ));
    let delete_message_usecase = Arc::new(DeleteMessageUseCase::new(
        message_store.clone(),
        connections.clone(),
        router.clone(),
    ));
    let typing_signal_usecase = Arc::new(TypingSignalUseCase::new(
        typing,
        connections.clone(),
        router,
    ));

    // 4. Create and run the server
    let server = Server::new(
        connect_session_usecase,
        disconnect_session_usecase,
        join_room_usecase,
        leave_room_usecase,
        send_message_usecase,
        edit_message_usecase,
        delete_message_usecase,
        typing_signal_usecase,
        connections,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn demo_identity(name: &str) -> Identity {
    Identity::new(
        UserId::new(format!("u-{name}")).expect("Failed to create UserId"),
        Username::new(name.to_string()).expect("Failed to create Username"),
    )
}
