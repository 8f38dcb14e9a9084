//! UseCase: タイピングシグナル処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - TypingSignalUseCase の start / stop / sweep
//! - タイピング状態の更新とメンバーシップ確認
//!
//! ### なぜこのテストが必要か
//! - タイピングイベントは Message Store を経由しない唯一のイベント。
//!   メンバーシップ確認だけがここで行われる
//! - start の冪等性（集合挿入でありカウンタではない）を保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：メンバーからの start / stop
//! - 異常系：非メンバーからのシグナル
//! - エッジケース：stop の繰り返し、期限切れの掃き出し

use std::sync::Arc;

use crate::domain::{ConnectionId, Identity, RoomId, UserId};
use crate::infrastructure::broadcast::BroadcastRouter;
use crate::infrastructure::connection::ConnectionManager;
use crate::infrastructure::presence::TypingTracker;

use super::error::TypingError;

/// タイピングシグナルのユースケース
pub struct TypingSignalUseCase {
    /// タイピング状態
    typing: Arc<TypingTracker>,
    /// ライブコネクション表
    connections: Arc<ConnectionManager>,
    /// BroadcastRouter（ルームスコープのイベント配送）
    router: Arc<BroadcastRouter>,
}

impl TypingSignalUseCase {
    /// 新しい TypingSignalUseCase を作成
    pub fn new(
        typing: Arc<TypingTracker>,
        connections: Arc<ConnectionManager>,
        router: Arc<BroadcastRouter>,
    ) -> Self {
        Self {
            typing,
            connections,
            router,
        }
    }

    /// タイピング開始を記録
    ///
    /// 冪等な集合挿入です。エントリの deadline はシグナルのたびに更新され
    /// ます。要求元の Identity を返すので、呼び出し元はそれから
    /// userTyping イベントを組み立てます。
    pub async fn execute_start(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<Identity, TypingError> {
        let identity = self.member_identity(connection_id, &room_id).await?;
        self.typing.start(room_id, &identity).await;
        Ok(identity)
    }

    /// タイピング終了を記録（冪等な集合削除）
    pub async fn execute_stop(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<Identity, TypingError> {
        let identity = self.member_identity(connection_id, room_id).await?;
        self.typing.stop(room_id, &identity.user_id).await;
        Ok(identity)
    }

    /// 期限切れエントリを取り除き、(ルーム, ユーザー) の一覧を返す
    ///
    /// UI 層の定期タスクから呼ばれます。呼び出し元はルームごとに
    /// userStoppedTyping をブロードキャストします。
    pub async fn sweep_expired(&self) -> Vec<(RoomId, UserId)> {
        self.typing.sweep_expired().await
    }

    /// タイピングイベントをルームの現在メンバー全員へブロードキャスト
    ///
    /// 発信元のコネクションも配送対象に含まれます（自分の表示から
    /// 除外するのはクライアントの責務）。
    pub async fn broadcast_signal(&self, room_id: &RoomId, message: &str) {
        self.router.broadcast_room(room_id, message).await;
    }

    async fn member_identity(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<Identity, TypingError> {
        let identity = self
            .connections
            .identity_of(connection_id)
            .await
            .ok_or(TypingError::ConnectionNotFound)?;
        if !self.connections.is_member(connection_id, room_id).await {
            return Err(TypingError::NotJoined);
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Connection, ConnectionIdFactory, Timestamp, Username,
    };
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    struct Fixture {
        usecase: TypingSignalUseCase,
        connections: Arc<ConnectionManager>,
        typing: Arc<TypingTracker>,
    }

    fn fixture() -> Fixture {
        let connections = Arc::new(ConnectionManager::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let typing = Arc::new(TypingTracker::new());
        let router = Arc::new(BroadcastRouter::new(connections.clone(), pusher));
        Fixture {
            usecase: TypingSignalUseCase::new(typing.clone(), connections.clone(), router),
            connections,
            typing,
        }
    }

    async fn join(fixture: &Fixture, user_id: &str, room_name: &str) -> ConnectionId {
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            Identity::new(
                user(user_id),
                Username::new(user_id.to_string()).unwrap(),
            ),
            Timestamp::new(1000),
        );
        let connection_id = connection.connection_id.clone();
        fixture.connections.register(connection).await;
        fixture
            .connections
            .join_room(&connection_id, room(room_name))
            .await;
        connection_id
    }

    #[tokio::test]
    async fn test_start_typing_records_entry() {
        // テスト項目: メンバーからの start がエントリを作り Identity を返す
        // given (前提条件):
        let fixture = fixture();
        let alice = join(&fixture, "alice", "general").await;

        // when (操作):
        let identity = fixture
            .usecase
            .execute_start(&alice, room("general"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(identity.user_id, user("alice"));
        let typing = fixture.typing.typing_users(&room("general")).await;
        assert_eq!(typing.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_start_is_single_entry() {
        // テスト項目: start の繰り返しはカウンタではなく集合挿入になる
        // given (前提条件):
        let fixture = fixture();
        let alice = join(&fixture, "alice", "general").await;

        // when (操作):
        for _ in 0..3 {
            fixture
                .usecase
                .execute_start(&alice, room("general"))
                .await
                .unwrap();
        }

        // then (期待する結果): stop 一回で消える
        fixture
            .usecase
            .execute_stop(&alice, &room("general"))
            .await
            .unwrap();
        assert!(fixture.typing.typing_users(&room("general")).await.is_empty());
    }

    #[tokio::test]
    async fn test_stop_twice_is_idempotent() {
        // テスト項目: stop を二度実行しても一度の場合と同じ状態になる
        // given (前提条件):
        let fixture = fixture();
        let alice = join(&fixture, "alice", "general").await;
        fixture
            .usecase
            .execute_start(&alice, room("general"))
            .await
            .unwrap();

        // when (操作):
        fixture
            .usecase
            .execute_stop(&alice, &room("general"))
            .await
            .unwrap();
        let second = fixture.usecase.execute_stop(&alice, &room("general")).await;

        // then (期待する結果): 2 回目もエラーにならない
        assert!(second.is_ok());
        assert!(fixture.typing.typing_users(&room("general")).await.is_empty());
    }

    #[tokio::test]
    async fn test_typing_from_non_member() {
        // テスト項目: メンバーでないコネクションからのシグナルは NotJoined になる
        // given (前提条件):
        let fixture = fixture();
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            Identity::new(user("carol"), Username::new("carol".to_string()).unwrap()),
            Timestamp::new(1000),
        );
        let carol = connection.connection_id.clone();
        fixture.connections.register(connection).await;

        // when (操作):
        let result = fixture.usecase.execute_start(&carol, room("general")).await;

        // then (期待する結果):
        assert_eq!(result, Err(TypingError::NotJoined));
        assert!(fixture.typing.typing_users(&room("general")).await.is_empty());
    }

    #[tokio::test]
    async fn test_typing_from_unregistered_connection() {
        // テスト項目: 未登録コネクションからのシグナルは ConnectionNotFound になる
        // given (前提条件):
        let fixture = fixture();

        // when (操作):
        let result = fixture
            .usecase
            .execute_start(&ConnectionIdFactory::generate(), room("general"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(TypingError::ConnectionNotFound));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_returns_expired_entries() {
        // テスト項目: 期限切れエントリが sweep で返り、状態から消える
        // given (前提条件):
        let fixture = fixture();
        let alice = join(&fixture, "alice", "general").await;
        fixture
            .usecase
            .execute_start(&alice, room("general"))
            .await
            .unwrap();

        // when (操作): TTL を超えて時間を進める
        tokio::time::advance(std::time::Duration::from_secs(7)).await;
        let expired = fixture.usecase.sweep_expired().await;

        // then (期待する結果):
        assert_eq!(expired, vec![(room("general"), user("alice"))]);
        assert!(fixture.typing.typing_users(&room("general")).await.is_empty());
    }
}
