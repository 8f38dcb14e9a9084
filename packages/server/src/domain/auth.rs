//! Session Authenticator の trait 定義
//!
//! 接続時に一度だけ credential トークンを Identity へ解決します。
//! 失敗はどれも接続試行ごと拒否され、部分的なセッションは作られません。
//! 解決は参照のみで、永続エンティティを変更してはいけません。

use async_trait::async_trait;
use thiserror::Error;

use super::entity::Identity;

/// 認証エラー
///
/// いずれも接続レベルのエラーであり、該当する接続試行に対して致命的です。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// トークンが不正（未署名・署名不一致・形式不正）
    #[error("invalid credential token")]
    InvalidToken,
    /// トークンの有効期限切れ
    #[error("credential token has expired")]
    ExpiredToken,
    /// トークンは正当だが、subject のユーザーが存在しない
    #[error("identity not found")]
    IdentityNotFound,
}

/// Identity Resolver trait
///
/// 署名付きトークンを検証し、埋め込まれた subject を公開アイデンティティへ
/// 解決します。再認証には新しい接続が必要です。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// トークンを検証し Identity を解決する
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError>;
}
