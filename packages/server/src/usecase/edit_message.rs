//! UseCase: メッセージ編集処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EditMessageUseCase::execute() メソッド
//! - メッセージ編集処理（本文検証、作成者チェック、更新）
//!
//! ### なぜこのテストが必要か
//! - 編集できるのは作成者本人だけ、という所有権チェックを保証する
//! - 編集後のメッセージが edited=true で返ることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成者本人による編集
//! - 異常系：他人のメッセージの編集 / 存在しないメッセージ / 空本文
//! - エッジケース：ルーム違いの ID 指定

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ConnectionId, MessageContent, MessageId, MessageStore, RepositoryError, RoomId,
};
use crate::infrastructure::broadcast::BroadcastRouter;
use crate::infrastructure::connection::ConnectionManager;

use super::error::EditMessageError;

/// メッセージ編集のユースケース
pub struct EditMessageUseCase {
    /// Message Store（追記専用のメッセージログ）
    message_store: Arc<dyn MessageStore>,
    /// ライブコネクション表
    connections: Arc<ConnectionManager>,
    /// BroadcastRouter（ルームスコープのイベント配送）
    router: Arc<BroadcastRouter>,
}

impl EditMessageUseCase {
    /// 新しい EditMessageUseCase を作成
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

    /// メッセージ編集を実行
    ///
    /// 編集できるのはメッセージの作成者本人だけです。成功すると本文が
    /// 更新され edited フラグが立ちます（last-write-wins）。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        message_id: MessageId,
        room_id: RoomId,
        text: String,
    ) -> Result<ChatMessage, EditMessageError> {
        // 1. 本文の検証
        let content = MessageContent::new(text)?;

        // 2. 要求元がルームのメンバーであること
        let editor = self
            .connections
            .identity_of(connection_id)
            .await
            .ok_or(EditMessageError::ConnectionNotFound)?;
        if !self.connections.is_member(connection_id, &room_id).await {
            return Err(EditMessageError::NotJoined);
        }

        // 3. 対象メッセージの取得と作成者チェック
        let existing = self
            .message_store
            .get_message(&message_id, &room_id)
            .await
            .map_err(map_repository_error)?;
        if existing.sender_id != editor.user_id {
            return Err(EditMessageError::Forbidden);
        }

        // 4. 更新（await してから返す）
        let updated = self
            .message_store
            .update_message(&message_id, &room_id, content)
            .await
            .map_err(map_repository_error)?;

        Ok(updated)
    }

    /// 更新イベントをルームの現在メンバー全員へブロードキャスト
    pub async fn broadcast_message_update(&self, room_id: &RoomId, message: &str) {
        self.router.broadcast_room(room_id, message).await;
    }
}

fn map_repository_error(e: RepositoryError) -> EditMessageError {
    match e {
        RepositoryError::MessageNotFound | RepositoryError::RoomNotFound => {
            EditMessageError::MessageNotFound
        }
        other => EditMessageError::Storage(other.to_string()),
    }
}
