//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use irori_shared::time::get_utc_timestamp;

use crate::{
    domain::{ConnectionId, Identity, MessageId, PusherChannel, RoomId, Timestamp},
    infrastructure::dto::websocket::{
        ClientEvent, ErrorPayload, MessageDto, MessageUpdatePayload, ServerEvent,
        UserStoppedTypingPayload, UserTypingPayload,
    },
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
///
/// The credential token is supplied at connect time; a missing or invalid
/// token refuses the connection before any event handler runs.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // Use ConnectSessionUseCase to authenticate and register the connection
    // before the upgrade completes; a failed authentication never reaches
    // any event handler.
    match state.connect_session_usecase.execute(&query.token, tx.clone()).await {
        Ok(connection) => {
            tracing::info!(
                "User '{}' connected as '{}'",
                connection.identity.username.as_str(),
                connection.connection_id.as_str()
            );
            Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, connection.connection_id, connection.identity, tx, rx)))
        }
        Err(e) => {
            tracing::warn!("Rejecting connection attempt: {}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This function handles the outbound message flow: events addressed to this
/// connection (via rx channel) are sent to its WebSocket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this client
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    identity: Identity,
    tx: PusherChannel,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();

    // Spawn a task to push events from other tasks to this client
    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();
    let identity_clone = identity.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_client_event(
                        &state_clone,
                        &connection_id_clone,
                        &identity_clone,
                        &tx,
                        &text,
                    )
                    .await;
                }
                Message::Ping(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!(
                        "Connection '{}' requested close",
                        connection_id_clone.as_str()
                    );
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other; closing the
    // transport promptly cancels further delivery attempts to it
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Use DisconnectSessionUseCase to handle disconnection: membership is
    // removed everywhere and the identity's typing indicators are cleared,
    // with one stop-typing broadcast per affected room
    if let Some((connection, cleared_rooms)) = state
        .disconnect_session_usecase
        .execute(&connection_id)
        .await
    {
        for room_id in cleared_rooms {
            let event = ServerEvent::UserStoppedTyping(UserStoppedTypingPayload::from_user(
                &connection.identity.user_id,
                &room_id,
            ));
            let json = serde_json::to_string(&event).unwrap();
            state
                .disconnect_session_usecase
                .broadcast_typing_stopped(&room_id, &json)
                .await;
        }
        tracing::info!(
            "User '{}' disconnected ('{}')",
            connection.identity.username.as_str(),
            connection_id.as_str()
        );
    }
}

/// Decode one inbound frame and dispatch it to the matching use case.
///
/// Operation-level failures are acknowledged to the requesting connection
/// only; other room members observe nothing.
async fn handle_client_event(
    state: &AppState,
    connection_id: &ConnectionId,
    identity: &Identity,
    tx: &PusherChannel,
    text: &str,
) {
    state
        .connections
        .touch(connection_id, Timestamp::new(get_utc_timestamp()))
        .await;

    // Closed tagged union: unrecognized event names and payload shapes are
    // rejected with a decode error instead of silently accepting partial data
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Failed to decode client event: {}", e);
            ack_error(tx, "invalid event payload");
            return;
        }
    };

    match event {
        ClientEvent::JoinRoom(room_id) => {
            let Ok(room_id) = RoomId::new(room_id) else {
                ack_error(tx, "invalid room id");
                return;
            };
            if let Err(e) = state.join_room_usecase.execute(connection_id, room_id).await {
                ack_error(tx, &e.to_string());
            }
        }
        ClientEvent::LeaveRoom(room_id) => {
            let Ok(room_id) = RoomId::new(room_id) else {
                ack_error(tx, "invalid room id");
                return;
            };
            state.leave_room_usecase.execute(connection_id, &room_id).await;
        }
        ClientEvent::SendMessage(payload) => {
            let Ok(room_id) = RoomId::new(payload.room_id) else {
                ack_error(tx, "invalid room id");
                return;
            };
            match state
                .send_message_usecase
                .execute(connection_id, room_id, payload.text)
                .await
            {
                Ok(message) => {
                    let event = ServerEvent::NewMessage(MessageDto::from_message(&message, identity));
                    let json = serde_json::to_string(&event).unwrap();
                    state
                        .send_message_usecase
                        .broadcast_new_message(&message.room_id, &json)
                        .await;
                }
                Err(e) => ack_error(tx, &e.to_string()),
            }
        }
        ClientEvent::EditMessage(payload) => {
            let Ok(room_id) = RoomId::new(payload.room_id) else {
                ack_error(tx, "invalid room id");
                return;
            };
            let Ok(message_id) = MessageId::new(payload.message_id) else {
                ack_error(tx, "invalid message id");
                return;
            };
            match state
                .edit_message_usecase
                .execute(connection_id, message_id, room_id, payload.text)
                .await
            {
                Ok(updated) => {
                    let event = ServerEvent::MessageUpdate(MessageUpdatePayload {
                        message_id: updated.message_id.as_str().to_string(),
                        updated_message: MessageDto::from_message(&updated, identity),
                    });
                    let json = serde_json::to_string(&event).unwrap();
                    state
                        .edit_message_usecase
                        .broadcast_message_update(&updated.room_id, &json)
                        .await;
                }
                Err(e) => ack_error(tx, &e.to_string()),
            }
        }
        ClientEvent::DeleteMessage(payload) => {
            let Ok(room_id) = RoomId::new(payload.room_id) else {
                ack_error(tx, "invalid room id");
                return;
            };
            let Ok(message_id) = MessageId::new(payload.message_id) else {
                ack_error(tx, "invalid message id");
                return;
            };
            match state
                .delete_message_usecase
                .execute(connection_id, &message_id, &room_id)
                .await
            {
                Ok(()) => {
                    let event = ServerEvent::MessageDelete(message_id.into_string());
                    let json = serde_json::to_string(&event).unwrap();
                    state
                        .delete_message_usecase
                        .broadcast_message_delete(&room_id, &json)
                        .await;
                }
                Err(e) => ack_error(tx, &e.to_string()),
            }
        }
        ClientEvent::Typing(payload) => {
            let Ok(room_id) = RoomId::new(payload.room_id) else {
                ack_error(tx, "invalid room id");
                return;
            };
            match state
                .typing_signal_usecase
                .execute_start(connection_id, room_id.clone())
                .await
            {
                Ok(identity) => {
                    let event = ServerEvent::UserTyping(UserTypingPayload::from_identity(
                        &identity, &room_id,
                    ));
                    let json = serde_json::to_string(&event).unwrap();
                    state
                        .typing_signal_usecase
                        .broadcast_signal(&room_id, &json)
                        .await;
                }
                Err(e) => ack_error(tx, &e.to_string()),
            }
        }
        ClientEvent::StopTyping(payload) => {
            let Ok(room_id) = RoomId::new(payload.room_id) else {
                ack_error(tx, "invalid room id");
                return;
            };
            match state
                .typing_signal_usecase
                .execute_stop(connection_id, &room_id)
                .await
            {
                Ok(identity) => {
                    let event = ServerEvent::UserStoppedTyping(UserStoppedTypingPayload::from_user(
                        &identity.user_id,
                        &room_id,
                    ));
                    let json = serde_json::to_string(&event).unwrap();
                    state
                        .typing_signal_usecase
                        .broadcast_signal(&room_id, &json)
                        .await;
                }
                Err(e) => ack_error(tx, &e.to_string()),
            }
        }
    }
}

/// Send an error event to the requesting connection only.
fn ack_error(tx: &PusherChannel, message: &str) {
    let event = ServerEvent::Error(ErrorPayload {
        message: message.to_string(),
    });
    let json = serde_json::to_string(&event).unwrap();
    // The connection's own disconnect path cleans up if the channel is gone
    let _ = tx.send(json);
}
