//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::infrastructure::connection::ConnectionManager;
use crate::infrastructure::dto::websocket::{ServerEvent, UserStoppedTypingPayload};
use crate::usecase::{
    ConnectSessionUseCase, DeleteMessageUseCase, DisconnectSessionUseCase, EditMessageUseCase,
    JoinRoomUseCase, LeaveRoomUseCase, SendMessageUseCase, TypingSignalUseCase,
};

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// タイピングエントリの期限切れを掃き出す間隔
const TYPING_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

/// WebSocket chat server
///
/// This struct encapsulates the wired use cases and provides methods to run
/// the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_session_usecase,
///     disconnect_session_usecase,
///     join_room_usecase,
///     leave_room_usecase,
///     send_message_usecase,
///     edit_message_usecase,
///     delete_message_usecase,
///     typing_signal_usecase,
///     connections,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ConnectSessionUseCase（セッション接続のユースケース）
    connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（セッション切断のユースケース）
    disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// JoinRoomUseCase（ルーム join のユースケース）
    join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム leave のユースケース）
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    send_message_usecase: Arc<SendMessageUseCase>,
    /// EditMessageUseCase（メッセージ編集のユースケース）
    edit_message_usecase: Arc<EditMessageUseCase>,
    /// DeleteMessageUseCase（メッセージ削除のユースケース）
    delete_message_usecase: Arc<DeleteMessageUseCase>,
    /// TypingSignalUseCase（タイピングシグナルのユースケース）
    typing_signal_usecase: Arc<TypingSignalUseCase>,
    /// ライブコネクション表
    connections: Arc<ConnectionManager>,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        edit_message_usecase: Arc<EditMessageUseCase>,
        delete_message_usecase: Arc<DeleteMessageUseCase>,
        typing_signal_usecase: Arc<TypingSignalUseCase>,
        connections: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            connect_session_usecase,
            disconnect_session_usecase,
            join_room_usecase,
            leave_room_usecase,
            send_message_usecase,
            edit_message_usecase,
            delete_message_usecase,
            typing_signal_usecase,
            connections,
        }
    }

    /// Build the axum Router serving the WebSocket endpoint and the HTTP API
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            connect_session_usecase: self.connect_session_usecase.clone(),
            disconnect_session_usecase: self.disconnect_session_usecase.clone(),
            join_room_usecase: self.join_room_usecase.clone(),
            leave_room_usecase: self.leave_room_usecase.clone(),
            send_message_usecase: self.send_message_usecase.clone(),
            edit_message_usecase: self.edit_message_usecase.clone(),
            delete_message_usecase: self.delete_message_usecase.clone(),
            typing_signal_usecase: self.typing_signal_usecase.clone(),
            connections: self.connections.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the WebSocket chat server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let typing_signal_usecase = self.typing_signal_usecase.clone();
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "WebSocket chat server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws?token=<jwt>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Sweep expired typing entries so a vanished client cannot leave a
        // stale indicator behind
        let sweeper = tokio::spawn(typing_sweeper(typing_signal_usecase));

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        sweeper.abort();
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Periodically drop typing entries whose deadline has passed and notify the
/// affected rooms.
async fn typing_sweeper(typing_signal_usecase: Arc<TypingSignalUseCase>) {
    let mut interval = tokio::time::interval(TYPING_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        for (room_id, user_id) in typing_signal_usecase.sweep_expired().await {
            tracing::debug!(
                "Typing entry for user '{}' in room '{}' expired",
                user_id.as_str(),
                room_id.as_str()
            );
            let event = ServerEvent::UserStoppedTyping(UserStoppedTypingPayload::from_user(
                &user_id, &room_id,
            ));
            let json = serde_json::to_string(&event).unwrap();
            typing_signal_usecase.broadcast_signal(&room_id, &json).await;
        }
    }
}
