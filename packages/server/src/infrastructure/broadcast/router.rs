//! BroadcastRouter 実装
//!
//! ## 責務
//!
//! - ルームスコープのイベントを、そのルームに現在 join 中の全コネクション
//!   へ配送する
//!
//! ## 設計ノート
//!
//! ターゲットは送信時点のライブなメンバーシップ集合から決まります
//! （スナップショットの持ち回しはしない）。個々の配送は独立した
//! ベストエフォートで、1 件の失敗が他の配送を妨げることはありません。
//! メンバーでないコネクションには決して配送されません。

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomId};
use crate::infrastructure::connection::ConnectionManager;

/// ルームの現在メンバーへのイベント配送
pub struct BroadcastRouter {
    /// メンバーシップインデックス
    connections: Arc<ConnectionManager>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl BroadcastRouter {
    /// 新しい BroadcastRouter を作成
    pub fn new(connections: Arc<ConnectionManager>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            connections,
            message_pusher,
        }
    }

    /// ルームの現在メンバー全員へイベントを配送
    pub async fn broadcast_room(&self, room_id: &RoomId, payload: &str) {
        let targets = self.connections.members_of(room_id).await;
        if targets.is_empty() {
            return;
        }

        if let Err(e) = self.message_pusher.broadcast(targets, payload).await {
            tracing::warn!("Broadcast to room '{}' failed: {}", room_id.as_str(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Connection, ConnectionId, ConnectionIdFactory, Identity, Timestamp, UserId, Username,
    };
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ルームメンバーだけにイベントが配送されること
    // - メンバーシップがライブに参照されること（leave 後は配送されない）
    //
    // 【なぜこのテストが必要か】
    // - 「join 中のメンバー全員に届き、メンバー以外には届かない」は
    //   サービス全体の配送不変条件であり、Router が唯一の経路
    // ========================================

    async fn register_member(
        manager: &ConnectionManager,
        pusher: &WebSocketMessagePusher,
        user_id: &str,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            Identity::new(
                UserId::new(user_id.to_string()).unwrap(),
                Username::new(user_id.to_string()).unwrap(),
            ),
            Timestamp::new(1000),
        );
        let connection_id = connection.connection_id.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        manager.register(connection).await;
        pusher.register_client(connection_id.clone(), tx).await;
        (connection_id, rx)
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_members_and_only_members() {
        // テスト項目: ルームの全メンバーに届き、非メンバーには届かない
        // given (前提条件):
        let manager = Arc::new(ConnectionManager::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let router = BroadcastRouter::new(manager.clone(), pusher.clone());

        let (alice, mut alice_rx) = register_member(&manager, &pusher, "alice").await;
        let (bob, mut bob_rx) = register_member(&manager, &pusher, "bob").await;
        let (_carol, mut carol_rx) = register_member(&manager, &pusher, "carol").await;
        manager.join_room(&alice, room("general")).await;
        manager.join_room(&bob, room("general")).await;
        // carol はどのルームにも join しない

        // when (操作):
        router.broadcast_room(&room("general"), "hello").await;

        // then (期待する結果):
        assert_eq!(alice_rx.recv().await, Some("hello".to_string()));
        assert_eq!(bob_rx.recv().await, Some("hello".to_string()));
        assert!(carol_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_uses_live_membership() {
        // テスト項目: 配送対象は送信時点のメンバーシップから決まる
        // given (前提条件):
        let manager = Arc::new(ConnectionManager::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let router = BroadcastRouter::new(manager.clone(), pusher.clone());

        let (alice, mut alice_rx) = register_member(&manager, &pusher, "alice").await;
        manager.join_room(&alice, room("general")).await;

        // when (操作): leave 後にブロードキャスト
        manager.leave_room(&alice, &room("general")).await;
        router.broadcast_room(&room("general"), "after leave").await;

        // then (期待する結果): 届かない
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_room_is_noop() {
        // テスト項目: メンバーのいないルームへのブロードキャストは何もしない
        // given (前提条件):
        let manager = Arc::new(ConnectionManager::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let router = BroadcastRouter::new(manager, pusher);

        // when (操作):
        router.broadcast_room(&room("empty"), "nobody hears").await;

        // then (期待する結果): パニックやエラーにならない
    }
}
