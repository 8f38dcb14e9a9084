//! UseCase: メッセージ削除処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DeleteMessageUseCase::execute() メソッド
//! - メッセージ削除処理（作成者チェック、行の削除）
//!
//! ### なぜこのテストが必要か
//! - 削除できるのは作成者本人だけ、という所有権チェックを保証する
//! - 削除後の一覧にメッセージが残らないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成者本人による削除
//! - 異常系：他人のメッセージの削除 / 存在しないメッセージ

use std::sync::Arc;

use crate::domain::{ConnectionId, MessageId, MessageStore, RepositoryError, RoomId};
use crate::infrastructure::broadcast::BroadcastRouter;
use crate::infrastructure::connection::ConnectionManager;

use super::error::DeleteMessageError;

/// メッセージ削除のユースケース
pub struct DeleteMessageUseCase {
    /// Message Store（追記専用のメッセージログ）
    message_store: Arc<dyn MessageStore>,
    /// ライブコネクション表
    connections: Arc<ConnectionManager>,
    /// BroadcastRouter（ルームスコープのイベント配送）
    router: Arc<BroadcastRouter>,
}

impl DeleteMessageUseCase {
    /// 新しい DeleteMessageUseCase を作成
    pub fn new(
        message_store: Arc<dyn MessageStore>,
        connections: Arc<ConnectionManager>,
        router: Arc<BroadcastRouter>,
    ) -> Self {
        Self {
            message_store,
            connections,
            router,
        }
    }

    /// メッセージ削除を実行
    ///
    /// 削除できるのはメッセージの作成者本人だけです。成功すると行が
    /// 取り除かれます。削除イベントにはメッセージ ID のみが載ります。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        message_id: &MessageId,
        room_id: &RoomId,
    ) -> Result<(), DeleteMessageError> {
        // 1. 要求元がルームのメンバーであること
        let requester = self
            .connections
            .identity_of(connection_id)
            .await
            .ok_or(DeleteMessageError::ConnectionNotFound)?;
        if !self.connections.is_member(connection_id, room_id).await {
            return Err(DeleteMessageError::NotJoined);
        }

        // 2. 対象メッセージの取得と作成者チェック
        let existing = self
            .message_store
            .get_message(message_id, room_id)
            .await
            .map_err(map_repository_error)?;
        if existing.sender_id != requester.user_id {
            return Err(DeleteMessageError::Forbidden);
        }

        // 3. 削除（await してから返す）
        self.message_store
            .delete_message(message_id, room_id)
            .await
            .map_err(map_repository_error)?;

        Ok(())
    }

    /// 削除イベントをルームの現在メンバー全員へブロードキャスト
    pub async fn broadcast_message_delete(&self, room_id: &RoomId, message: &str) {
        self.router.broadcast_room(room_id, message).await;
    }
}

fn map_repository_error(e: RepositoryError) -> DeleteMessageError {
    match e {
        RepositoryError::MessageNotFound | RepositoryError::RoomNotFound => {
            DeleteMessageError::MessageNotFound
        }
        other => DeleteMessageError::Storage(other.to_string()),
    }
}
