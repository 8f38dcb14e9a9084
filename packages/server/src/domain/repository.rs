//! Repository trait 定義
//!
//! ドメイン層が必要とする永続ストアへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! Room Registry と Message Store は永続ストレージに触れる唯一の
//! コンポーネントであり、トランザクション保証はストア自身のものを
//! 利用します（ここでは再実装しない）。

use async_trait::async_trait;
use thiserror::Error;

use super::entity::ChatMessage;
use super::value_object::{MessageContent, MessageId, RoomId, UserId};

/// 永続ストア操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// 指定されたルームが存在しない
    #[error("room not found")]
    RoomNotFound,
    /// 指定されたメッセージが存在しない（ID 違い・ルーム違いの両方）
    #[error("message not found")]
    MessageNotFound,
    /// ストレージ障害。呼び出し元には一般的な失敗として報告される
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Room Registry trait
///
/// ルーム存在確認の正となるインターフェース。Connection Manager は
/// ルームを作成せず、この trait を通じて存在確認のみ行います。
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// ルームが存在するか確認
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, RepositoryError>;
}

/// Message Store trait
///
/// ルームごとの追記専用メッセージログ。ID とタイムスタンプの採番は
/// ストア側が行い、同一ルームへの並行書き込みはストア側で直列化されます。
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// メッセージを永続化し、採番済みのメッセージを返す
    async fn create_message(
        &self,
        room_id: RoomId,
        content: MessageContent,
        sender_id: UserId,
    ) -> Result<ChatMessage, RepositoryError>;

    /// メッセージを取得（ID 違い・ルーム違いは MessageNotFound）
    async fn get_message(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
    ) -> Result<ChatMessage, RepositoryError>;

    /// メッセージ本文を更新し、edited フラグを立てる
    async fn update_message(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
        content: MessageContent,
    ) -> Result<ChatMessage, RepositoryError>;

    /// メッセージを削除
    async fn delete_message(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
    ) -> Result<(), RepositoryError>;

    /// ルームのメッセージ一覧を永続順（created_at、同時刻は挿入順）で取得
    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, RepositoryError>;
}
