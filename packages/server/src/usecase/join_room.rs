//! UseCase: ルーム join 処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルーム存在確認とメンバーシップ登録
//!
//! ### なぜこのテストが必要か
//! - 存在しないルームへの join が拒否されることを保証する
//! - join 成功後にブロードキャスト対象へ含まれることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：存在するルームへの join
//! - 異常系：存在しないルーム / 未登録コネクション
//! - エッジケース：leave せずに 2 つ目のルームへ join

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, RoomRegistry};
use crate::infrastructure::connection::ConnectionManager;

use super::error::JoinRoomError;

/// ルーム join のユースケース
pub struct JoinRoomUseCase {
    /// Room Registry（ルーム存在確認の正）
    room_registry: Arc<dyn RoomRegistry>,
    /// ライブコネクション表
    connections: Arc<ConnectionManager>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(room_registry: Arc<dyn RoomRegistry>, connections: Arc<ConnectionManager>) -> Self {
        Self {
            room_registry,
            connections,
        }
    }

    /// ルーム join を実行
    ///
    /// Room Registry でルームの存在を確認してから、メンバーシップ
    /// インデックスへ登録します。登録はロック解放と同時にブロードキャスト
    /// 対象の選定へ反映されます。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<(), JoinRoomError> {
        // 1. ルームの存在確認
        let exists = self
            .room_registry
            .room_exists(&room_id)
            .await
            .map_err(|e| JoinRoomError::Storage(e.to_string()))?;
        if !exists {
            return Err(JoinRoomError::RoomNotFound);
        }

        // 2. メンバーシップへ登録
        if !self.connections.join_room(connection_id, room_id).await {
            return Err(JoinRoomError::ConnectionNotFound);
        }

        Ok(())
    }
}
