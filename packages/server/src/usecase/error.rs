//! UseCase 層のエラー定義
//!
//! 接続レベルのエラー（ConnectError）は該当する接続試行を即座に終了させ
//! ます。操作レベルのエラーは要求元のコネクションにのみ報告され、他の
//! メンバーには一切見えません。ストレージ障害は一般的な失敗として要求元に
//! 返り、プロセスは落としません（リトライはコアに埋め込まない）。

use thiserror::Error;

use crate::domain::{AuthError, ContentError};

/// 接続確立のエラー（接続レベル・致命的）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// トークンが不正
    #[error("authentication failed: invalid token")]
    AuthInvalid,
    /// トークンの有効期限切れ
    #[error("authentication failed: token has expired")]
    AuthExpired,
    /// subject のユーザーが存在しない
    #[error("authentication failed: identity not found")]
    IdentityNotFound,
}

impl From<AuthError> for ConnectError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => ConnectError::AuthInvalid,
            AuthError::ExpiredToken => ConnectError::AuthExpired,
            AuthError::IdentityNotFound => ConnectError::IdentityNotFound,
        }
    }
}

/// ルーム join のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    /// 指定されたルームが存在しない
    #[error("room not found")]
    RoomNotFound,
    /// コネクションが登録されていない
    #[error("connection is not registered")]
    ConnectionNotFound,
    /// ストレージ障害
    #[error("storage unavailable: {0}")]
    Storage(String),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// トリム後に本文が空
    #[error("message text is required")]
    EmptyText,
    /// 本文が最大長を超過
    #[error("message text is too long")]
    TextTooLong,
    /// 指定されたルームが存在しない
    #[error("room not found")]
    RoomNotFound,
    /// 送信元コネクションがルームのメンバーではない
    #[error("not a member of the room")]
    NotJoined,
    /// コネクションが登録されていない
    #[error("connection is not registered")]
    ConnectionNotFound,
    /// ストレージ障害
    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl From<ContentError> for SendMessageError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::Empty => SendMessageError::EmptyText,
            ContentError::TooLong(_) => SendMessageError::TextTooLong,
        }
    }
}

/// メッセージ編集のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditMessageError {
    /// トリム後に本文が空
    #[error("message text is required")]
    EmptyText,
    /// 本文が最大長を超過
    #[error("message text is too long")]
    TextTooLong,
    /// メッセージが存在しない（ID 違い・ルーム違いの両方）
    #[error("message not found")]
    MessageNotFound,
    /// 作成者以外による編集
    #[error("only the author can edit a message")]
    Forbidden,
    /// 要求元コネクションがルームのメンバーではない
    #[error("not a member of the room")]
    NotJoined,
    /// コネクションが登録されていない
    #[error("connection is not registered")]
    ConnectionNotFound,
    /// ストレージ障害
    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl From<ContentError> for EditMessageError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::Empty => EditMessageError::EmptyText,
            ContentError::TooLong(_) => EditMessageError::TextTooLong,
        }
    }
}

/// メッセージ削除のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteMessageError {
    /// メッセージが存在しない（ID 違い・ルーム違いの両方）
    #[error("message not found")]
    MessageNotFound,
    /// 作成者以外による削除
    #[error("only the author can delete a message")]
    Forbidden,
    /// 要求元コネクションがルームのメンバーではない
    #[error("not a member of the room")]
    NotJoined,
    /// コネクションが登録されていない
    #[error("connection is not registered")]
    ConnectionNotFound,
    /// ストレージ障害
    #[error("storage unavailable: {0}")]
    Storage(String),
}

/// タイピングシグナルのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypingError {
    /// 要求元コネクションがルームのメンバーではない
    #[error("not a member of the room")]
    NotJoined,
    /// コネクションが登録されていない
    #[error("connection is not registered")]
    ConnectionNotFound,
}
