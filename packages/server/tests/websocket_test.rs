//! End-to-end tests for the real-time messaging core.
//!
//! Each test serves the real router on an ephemeral port and drives it with
//! real WebSocket clients, the way a browser client would: authenticate at
//! connect time, join rooms, exchange messages and typing signals.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use irori_server::{
    domain::{Identity, Room, RoomId, Timestamp, UserId, Username},
    infrastructure::{
        auth::{JwtIdentityResolver, issue_token},
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
use irori_shared::time::SystemClock;

const SECRET: &str = "e2e-test-secret";

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn identity(name: &str) -> Identity {
    Identity::new(
        UserId::new(format!("u-{name}")).unwrap(),
        Username::new(name.to_string()).unwrap(),
    )
}

/// Wire the full service with seeded users and rooms and serve it on an
/// ephemeral port.
async fn start_server() -> SocketAddr {
    let users = vec![identity("alice"), identity("bob"), identity("carol")];
    let identity_resolver = Arc::new(JwtIdentityResolver::new(SECRET, users.clone()));

    let room_registry = Arc::new(InMemoryRoomRegistry::new());
    for name in ["general", "random"] {
        room_registry
            .add_room(Room::new(
                RoomId::new(name.to_string()).unwrap(),
                name.to_string(),
                users[0].user_id.clone(),
                Timestamp::new(0),
            ))
            .await;
    }
    let message_store = Arc::new(InMemoryMessageStore::new(Arc::new(SystemClock)));

    let connections = Arc::new(ConnectionManager::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let typing = Arc::new(TypingTracker::new());
    let router = Arc::new(BroadcastRouter::new(
        connections.clone(),
        message_pusher.clone(),
    ));

    let server = Server::new(
        Arc::new(ConnectSessionUseCase::new(
            identity_resolver,
            connections.clone(),
            message_pusher.clone(),
        )),
        Arc::new(DisconnectSessionUseCase::new(
            connections.clone(),
            message_pusher.clone(),
            typing.clone(),
            router.clone(),
        )),
        Arc::new(JoinRoomUseCase::new(
            room_registry.clone(),
            connections.clone(),
        )),
        Arc::new(LeaveRoomUseCase::new(connections.clone())),
        Arc::new(SendMessageUseCase::new(
            room_registry,
            message_store.clone(),
            connections.clone(),
            router.clone(),
        )),
        Arc::new(EditMessageUseCase::new(
            message_store.clone(),
            connections.clone(),
            router.clone(),
        )),
        Arc::new(DeleteMessageUseCase::new(
            message_store,
            connections.clone(),
            router.clone(),
        )),
        Arc::new(TypingSignalUseCase::new(typing, connections.clone(), router)),
        connections,
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = server.router();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, name: &str) -> WsClient {
    let token = issue_token(SECRET, &identity(name).user_id, 3600).unwrap();
    let url = format!("ws://{addr}/ws?token={token}");
    let (ws, _) = connect_async(url).await.expect("connection refused");
    ws
}

async fn send_event(ws: &mut WsClient, json: &str) {
    ws.send(Message::Text(json.to_string().into()))
        .await
        .expect("failed to send event");
}

/// Receive frames until one carries the given event name; other events
/// (e.g. our own typing echoes) are skipped.
async fn recv_event(ws: &mut WsClient, event: &str) -> serde_json::Value {
    for _ in 0..10 {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream closed")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            if value["event"] == event {
                return value;
            }
        }
    }
    panic!("event '{event}' not received");
}

/// Assert that no event arrives within a short window.
async fn assert_silent(ws: &mut WsClient) {
    let result = tokio::time::timeout(Duration::from_millis(300), ws.next()).await;
    assert!(result.is_err(), "expected silence, got {:?}", result);
}

/// Join a room and prove the membership took effect by waiting for the echo
/// of an own marker message (joins have no acknowledgement of their own).
async fn join_and_sync(ws: &mut WsClient, room: &str, marker: &str) {
    send_event(ws, &format!(r#"{{"event":"joinRoom","data":"{room}"}}"#)).await;
    send_event(
        ws,
        &format!(r#"{{"event":"sendMessage","data":{{"roomId":"{room}","text":"{marker}"}}}}"#),
    )
    .await;
    loop {
        let event = recv_event(ws, "newMessage").await;
        if event["data"]["text"] == marker {
            break;
        }
    }
}

#[tokio::test]
async fn test_handshake_without_token_is_refused() {
    // A connection attempt without a credential never reaches any handler
    let addr = start_server().await;
    let result = connect_async(format!("ws://{addr}/ws")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_handshake_with_invalid_token_is_refused() {
    let addr = start_server().await;
    let result = connect_async(format!("ws://{addr}/ws?token=not-a-jwt")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_handshake_with_unknown_subject_is_refused() {
    // Valid signature, but the subject no longer exists
    let addr = start_server().await;
    let ghost = UserId::new("u-ghost".to_string()).unwrap();
    let token = issue_token(SECRET, &ghost, 3600).unwrap();
    let result = connect_async(format!("ws://{addr}/ws?token={token}")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_message_reaches_members_and_only_members() {
    let addr = start_server().await;
    let mut alice = connect(addr, "alice").await;
    let mut bob = connect(addr, "bob").await;
    let mut carol = connect(addr, "carol").await;

    join_and_sync(&mut alice, "general", "alice-ready").await;
    join_and_sync(&mut bob, "general", "bob-ready").await;
    // carol stays out of the room on purpose

    send_event(
        &mut alice,
        r#"{"event":"sendMessage","data":{"roomId":"general","text":"hi"}}"#,
    )
    .await;

    // Every member receives the persisted message with the sender expanded
    // to its public identity, the sender's own connection included
    for ws in [&mut alice, &mut bob] {
        let event = loop {
            let event = recv_event(ws, "newMessage").await;
            if event["data"]["text"] == "hi" {
                break event;
            }
        };
        assert_eq!(event["data"]["roomId"], "general");
        assert_eq!(event["data"]["sender"]["id"], "u-alice");
        assert_eq!(event["data"]["sender"]["username"], "alice");
        assert_eq!(event["data"]["edited"], false);
        assert!(event["data"]["messageId"].is_string());
        assert!(event["data"]["createdAt"].is_string());
    }

    // A connection that never joined the room observes nothing
    assert_silent(&mut carol).await;
}

#[tokio::test]
async fn test_messages_in_one_room_arrive_in_order() {
    let addr = start_server().await;
    let mut alice = connect(addr, "alice").await;
    let mut bob = connect(addr, "bob").await;

    join_and_sync(&mut alice, "general", "alice-ready").await;
    join_and_sync(&mut bob, "general", "bob-ready").await;

    send_event(
        &mut alice,
        r#"{"event":"sendMessage","data":{"roomId":"general","text":"first"}}"#,
    )
    .await;
    send_event(
        &mut alice,
        r#"{"event":"sendMessage","data":{"roomId":"general","text":"second"}}"#,
    )
    .await;

    let m1 = recv_event(&mut bob, "newMessage").await;
    let m2 = recv_event(&mut bob, "newMessage").await;
    assert_eq!(m1["data"]["text"], "first");
    assert_eq!(m2["data"]["text"], "second");
}

#[tokio::test]
async fn test_typing_flow() {
    let addr = start_server().await;
    let mut alice = connect(addr, "alice").await;
    let mut bob = connect(addr, "bob").await;

    join_and_sync(&mut alice, "general", "alice-ready").await;
    join_and_sync(&mut bob, "general", "bob-ready").await;

    send_event(&mut alice, r#"{"event":"typing","data":{"roomId":"general"}}"#).await;
    let typing = recv_event(&mut bob, "userTyping").await;
    assert_eq!(typing["data"]["userId"], "u-alice");
    assert_eq!(typing["data"]["username"], "alice");
    assert_eq!(typing["data"]["roomId"], "general");

    send_event(
        &mut alice,
        r#"{"event":"stopTyping","data":{"roomId":"general"}}"#,
    )
    .await;
    let stopped = recv_event(&mut bob, "userStoppedTyping").await;
    assert_eq!(stopped["data"]["userId"], "u-alice");
    assert_eq!(stopped["data"]["roomId"], "general");
}

#[tokio::test]
async fn test_disconnect_mid_typing_clears_indicator() {
    let addr = start_server().await;
    let mut alice = connect(addr, "alice").await;
    let mut bob = connect(addr, "bob").await;

    join_and_sync(&mut alice, "general", "alice-ready").await;
    join_and_sync(&mut bob, "general", "bob-ready").await;

    send_event(&mut alice, r#"{"event":"typing","data":{"roomId":"general"}}"#).await;
    recv_event(&mut bob, "userTyping").await;

    // Alice vanishes without sending stopTyping
    alice.close(None).await.unwrap();

    let stopped = recv_event(&mut bob, "userStoppedTyping").await;
    assert_eq!(stopped["data"]["userId"], "u-alice");
    assert_eq!(stopped["data"]["roomId"], "general");
}

#[tokio::test]
async fn test_edit_and_delete_round_trip() {
    let addr = start_server().await;
    let mut alice = connect(addr, "alice").await;
    let mut bob = connect(addr, "bob").await;

    join_and_sync(&mut alice, "general", "alice-ready").await;
    join_and_sync(&mut bob, "general", "bob-ready").await;

    send_event(
        &mut alice,
        r#"{"event":"sendMessage","data":{"roomId":"general","text":"hi"}}"#,
    )
    .await;
    let created = loop {
        let event = recv_event(&mut alice, "newMessage").await;
        if event["data"]["text"] == "hi" {
            break event;
        }
    };
    let message_id = created["data"]["messageId"].as_str().unwrap().to_string();

    // Author edits the message
    send_event(
        &mut alice,
        &format!(
            r#"{{"event":"editMessage","data":{{"messageId":"{message_id}","roomId":"general","text":"hello"}}}}"#
        ),
    )
    .await;
    let update = recv_event(&mut bob, "messageUpdate").await;
    assert_eq!(update["data"]["messageId"], message_id.as_str());
    assert_eq!(update["data"]["updatedMessage"]["text"], "hello");
    assert_eq!(update["data"]["updatedMessage"]["edited"], true);

    // A non-author cannot delete it; only the requester sees the error
    send_event(
        &mut bob,
        &format!(
            r#"{{"event":"deleteMessage","data":{{"messageId":"{message_id}","roomId":"general"}}}}"#
        ),
    )
    .await;
    let error = recv_event(&mut bob, "error").await;
    assert_eq!(error["data"]["message"], "only the author can delete a message");

    // The author deletes it; every member sees the removal
    send_event(
        &mut alice,
        &format!(
            r#"{{"event":"deleteMessage","data":{{"messageId":"{message_id}","roomId":"general"}}}}"#
        ),
    )
    .await;
    let deleted = recv_event(&mut bob, "messageDelete").await;
    assert_eq!(deleted["data"], message_id.as_str());
}

#[tokio::test]
async fn test_send_from_non_member_is_rejected_privately() {
    let addr = start_server().await;
    let mut alice = connect(addr, "alice").await;
    let mut carol = connect(addr, "carol").await;

    join_and_sync(&mut alice, "general", "alice-ready").await;

    // carol is connected but never joined the room
    send_event(
        &mut carol,
        r#"{"event":"sendMessage","data":{"roomId":"general","text":"sneaky"}}"#,
    )
    .await;

    let error = recv_event(&mut carol, "error").await;
    assert_eq!(error["data"]["message"], "not a member of the room");

    // The member observes nothing
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_join_unknown_room_is_rejected() {
    let addr = start_server().await;
    let mut alice = connect(addr, "alice").await;

    send_event(&mut alice, r#"{"event":"joinRoom","data":"nowhere"}"#).await;

    let error = recv_event(&mut alice, "error").await;
    assert_eq!(error["data"]["message"], "room not found");
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let addr = start_server().await;
    let mut alice = connect(addr, "alice").await;

    join_and_sync(&mut alice, "general", "alice-ready").await;
    send_event(
        &mut alice,
        r#"{"event":"sendMessage","data":{"roomId":"general","text":"   "}}"#,
    )
    .await;

    let error = recv_event(&mut alice, "error").await;
    assert_eq!(error["data"]["message"], "message text is required");
}

#[tokio::test]
async fn test_unrecognized_event_is_rejected() {
    let addr = start_server().await;
    let mut alice = connect(addr, "alice").await;

    send_event(
        &mut alice,
        r#"{"event":"launchMissiles","data":{"roomId":"general"}}"#,
    )
    .await;

    let error = recv_event(&mut alice, "error").await;
    assert_eq!(error["data"]["message"], "invalid event payload");
}

#[tokio::test]
async fn test_messages_do_not_cross_rooms() {
    let addr = start_server().await;
    let mut alice = connect(addr, "alice").await;
    let mut bob = connect(addr, "bob").await;

    join_and_sync(&mut alice, "general", "alice-ready").await;
    join_and_sync(&mut bob, "random", "bob-ready").await;

    send_event(
        &mut alice,
        r#"{"event":"sendMessage","data":{"roomId":"general","text":"general only"}}"#,
    )
    .await;

    // bob is a member of a different room and observes nothing
    assert_silent(&mut bob).await;
}
