//! UseCase: セッション接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - 接続確立処理（トークン解決、コネクション登録、Pusher 登録）
//!
//! ### なぜこのテストが必要か
//! - 認証失敗の分類（不正 / 期限切れ / 不在）がそのまま接続拒否の
//!   理由コードになる
//! - 認証が通るまでコネクション表に何も残らないこと（部分セッションを
//!   作らない）を保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：正当なトークンでの接続
//! - 異常系：不正トークン / 期限切れ / 未知の subject
//! - エッジケース：同一ユーザーの複数接続（マルチデバイス）

use std::sync::Arc;

use irori_shared::time::get_utc_timestamp;

use crate::domain::{
    Connection, ConnectionIdFactory, IdentityResolver, MessagePusher, PusherChannel, Timestamp,
};
use crate::infrastructure::connection::ConnectionManager;

use super::error::ConnectError;

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    /// IdentityResolver（Session Authenticator の抽象化）
    identity_resolver: Arc<dyn IdentityResolver>,
    /// ライブコネクション表
    connections: Arc<ConnectionManager>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectSessionUseCase {
    /// 新しい ConnectSessionUseCase を作成
    pub fn new(
        identity_resolver: Arc<dyn IdentityResolver>,
        connections: Arc<ConnectionManager>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            identity_resolver,
            connections,
            message_pusher,
        }
    }

    /// 接続確立を実行
    ///
    /// # Arguments
    ///
    /// * `token` - 接続時に提示された credential トークン
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Connection)` - 登録済みのコネクション（Identity は以後不変）
    /// * `Err(ConnectError)` - 認証失敗。コネクション表には何も残らない
    pub async fn execute(
        &self,
        token: &str,
        sender: PusherChannel,
    ) -> Result<Connection, ConnectError> {
        // 1. トークンを Identity へ解決（失敗したら何も登録しない）
        let identity = self.identity_resolver.resolve(token).await?;

        // 2. コネクションを生成して登録
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            identity,
            Timestamp::new(get_utc_timestamp()),
        );
        self.connections.register(connection.clone()).await;

        // 3. MessagePusher に sender を登録
        self.message_pusher
            .register_client(connection.connection_id.clone(), sender)
            .await;

        Ok(connection)
    }
}
