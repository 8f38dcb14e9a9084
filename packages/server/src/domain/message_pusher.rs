//! MessagePusher trait 定義
//!
//! 接続済みクライアントへのメッセージ送信を抽象化します。UseCase 層は
//! この trait に依存し、WebSocket 等のトランスポート実装には依存しません。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::value_object::ConnectionId;

/// クライアントへメッセージを送るためのチャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 対象のコネクションが登録されていない
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
    /// 送信失敗（トランスポート切断など）
    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// MessagePusher trait
///
/// コネクション単位で sender を管理し、単一送信（push_to）と
/// 複数送信（broadcast）を提供します。broadcast は一部の送信失敗を
/// 許容し、他のコネクションへの配送を妨げません。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// コネクションの sender を登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// コネクションの sender を登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のコネクションへ送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数のコネクションへベストエフォートで送信
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
