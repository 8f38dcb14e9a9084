//! UseCase: ルーム leave 処理
//!
//! leave は冪等です。メンバーでないルームからの leave は何もしません。
//! タイピング状態はここでは触りません（エントリが消えるのは明示的な
//! stop、期限切れ、切断の 3 経路のみ）。

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId};
use crate::infrastructure::connection::ConnectionManager;

/// ルーム leave のユースケース
pub struct LeaveRoomUseCase {
    /// ライブコネクション表
    connections: Arc<ConnectionManager>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// ルーム leave を実行（冪等）
    pub async fn execute(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        self.connections.leave_room(connection_id, room_id).await;
    }
}
