//! UseCase: セッション切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute() メソッド
//! - 切断処理（全ルームからの除去、タイピング状態のクリア）
//!
//! ### なぜこのテストが必要か
//! - 切断後のコネクションがどのルームのメンバーシップにも残らないことを
//!   保証する
//! - タイピング途中の切断で、その Identity のタイピング表示が全ルームで
//!   消えることを保証する（クライアントは stopTyping を送れない）
//!
//! ### どのような状況を想定しているか
//! - 正常系：join・タイピング中の切断
//! - エッジケース：未登録コネクションの切断（冪等）

use std::sync::Arc;

use crate::domain::{Connection, ConnectionId, MessagePusher, RoomId};
use crate::infrastructure::broadcast::BroadcastRouter;
use crate::infrastructure::connection::ConnectionManager;
use crate::infrastructure::presence::TypingTracker;

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    /// ライブコネクション表
    connections: Arc<ConnectionManager>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// タイピング状態
    typing: Arc<TypingTracker>,
    /// BroadcastRouter（ルームスコープのイベント配送）
    router: Arc<BroadcastRouter>,
}

impl DisconnectSessionUseCase {
    /// 新しい DisconnectSessionUseCase を作成
    pub fn new(
        connections: Arc<ConnectionManager>,
        message_pusher: Arc<dyn MessagePusher>,
        typing: Arc<TypingTracker>,
        router: Arc<BroadcastRouter>,
    ) -> Self {
        Self {
            connections,
            message_pusher,
            typing,
            router,
        }
    }

    /// セッション切断を実行
    ///
    /// コネクションを全ルームのメンバーシップから取り除き、その Identity の
    /// タイピング状態を全ルームでクリアします。
    ///
    /// # Returns
    ///
    /// * `Some((connection, cleared_rooms))` - 切断時点のコネクションと、
    ///   タイピング状態をクリアしたルームの一覧。呼び出し元はルームごとに
    ///   stop-typing イベントをブロードキャストする
    /// * `None` - 未登録のコネクション（冪等）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<(Connection, Vec<RoomId>)> {
        // 1. コネクション表・全ルームのメンバーシップから除去
        let connection = self.connections.unregister(connection_id).await?;

        // 2. MessagePusher から sender を除去（以後の配送対象から外れる）
        self.message_pusher.unregister_client(connection_id).await;

        // 3. タイピング状態を全ルームでクリア
        let cleared_rooms = self.typing.clear_user(&connection.identity.user_id).await;

        Some((connection, cleared_rooms))
    }

    /// タイピング終了イベントを残りのメンバーへブロードキャスト
    ///
    /// 切断したコネクションは既にメンバーシップから除かれているため、
    /// 配送対象には含まれません。
    pub async fn broadcast_typing_stopped(&self, room_id: &RoomId, message: &str) {
        self.router.broadcast_room(room_id, message).await;
    }
}
