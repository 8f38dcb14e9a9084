//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージ送信処理（本文検証、メンバーシップ確認、ルーム存在確認、
//!   永続化）
//!
//! ### なぜこのテストが必要か
//! - 永続化が完了してからブロードキャストされる、という順序がルーム内の
//!   メッセージ順序保証の根拠になっている
//! - メンバーでないコネクションからの送信が拒否されることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：メンバーからの送信と永続化
//! - 異常系：空本文 / 存在しないルーム / 非メンバーからの送信
//! - エッジケース：永続順（同一ルーム内の連続送信）

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ConnectionId, MessageContent, MessageStore, RepositoryError, RoomId, RoomRegistry,
};
use crate::infrastructure::broadcast::BroadcastRouter;
use crate::infrastructure::connection::ConnectionManager;

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Room Registry（ルーム存在確認の正）
    room_registry: Arc<dyn RoomRegistry>,
    /// Message Store（追記専用のメッセージログ）
    message_store: Arc<dyn MessageStore>,
    /// ライブコネクション表
    connections: Arc<ConnectionManager>,
    /// BroadcastRouter（ルームスコープのイベント配送）
    router: Arc<BroadcastRouter>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        room_registry: Arc<dyn RoomRegistry>,
        message_store: Arc<dyn MessageStore>,
        connections: Arc<ConnectionManager>,
        router: Arc<BroadcastRouter>,
    ) -> Self {
        Self {
            room_registry,
            message_store,
            connections,
            router,
        }
    }

    /// メッセージ送信を実行
    ///
    /// 検証 → 永続化の順で処理します。永続化は await されるため、返った
    /// メッセージは必ず書き込み済みです。ブロードキャストは呼び出し元が
    /// 採番済みフィールドから DTO を組み立てて `broadcast_new_message` で
    /// 行います。
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 採番済み（messageId / createdAt）の永続化結果
    /// * `Err(SendMessageError)` - 要求元にのみ報告される操作エラー
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        text: String,
    ) -> Result<ChatMessage, SendMessageError> {
        // 1. 本文の検証（トリム・空チェック・長さ）
        let content = MessageContent::new(text)?;

        // 2. 送信元がルームのメンバーであること
        let sender = self
            .connections
            .identity_of(connection_id)
            .await
            .ok_or(SendMessageError::ConnectionNotFound)?;
        if !self.connections.is_member(connection_id, &room_id).await {
            return Err(SendMessageError::NotJoined);
        }

        // 3. ルームの存在確認（書き込み時点の参照チェック）
        let exists = self
            .room_registry
            .room_exists(&room_id)
            .await
            .map_err(|e| SendMessageError::Storage(e.to_string()))?;
        if !exists {
            return Err(SendMessageError::RoomNotFound);
        }

        // 4. 永続化（await してから返す）
        let message = self
            .message_store
            .create_message(room_id, content, sender.user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound => SendMessageError::RoomNotFound,
                other => SendMessageError::Storage(other.to_string()),
            })?;

        Ok(message)
    }

    /// 永続化済みメッセージをルームの現在メンバー全員へブロードキャスト
    ///
    /// 送信者自身のコネクションも配送対象に含まれます。
    pub async fn broadcast_new_message(&self, room_id: &RoomId, message: &str) {
        self.router.broadcast_room(room_id, message).await;
    }
}
