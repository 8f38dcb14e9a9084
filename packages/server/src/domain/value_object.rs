//! Value Object 定義
//!
//! ドメイン層の値オブジェクト。すべて検証付きコンストラクタを持ち、
//! 不正な値はドメインに入る前に弾かれます。

use thiserror::Error;
use uuid::Uuid;

/// メッセージ本文の最大長（文字数）
pub const MAX_MESSAGE_CONTENT_CHARS: usize = 2000;

/// Value Object の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// 空文字（トリム後）
    #[error("text must not be empty")]
    Empty,
    /// 最大長超過
    #[error("text exceeds maximum length of {0} characters")]
    TooLong(usize),
}

/// ユーザー ID（認証済みユーザーの識別子）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// 新しい UserId を作成（空文字は不可）
    pub fn new(value: String) -> Result<Self, ContentError> {
        if value.trim().is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// ユーザーの公開名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// 新しい Username を作成（空文字は不可）
    pub fn new(value: String) -> Result<Self, ContentError> {
        if value.trim().is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// ルーム ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    /// 新しい RoomId を作成（空文字は不可）
    pub fn new(value: String) -> Result<Self, ContentError> {
        if value.trim().is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// メッセージ ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// 新しい MessageId を作成（空文字は不可）
    pub fn new(value: String) -> Result<Self, ContentError> {
        if value.trim().is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// MessageId の生成ファクトリ（UUID v4）
pub struct MessageIdFactory;

impl MessageIdFactory {
    pub fn generate() -> MessageId {
        MessageId(Uuid::new_v4().to_string())
    }
}

/// コネクション ID
///
/// 1 つのトランスポートセッションごとに一意。同一ユーザーが複数デバイスで
/// 接続した場合、それぞれ別の ConnectionId を持ちます。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// 新しい ConnectionId を作成（空文字は不可）
    pub fn new(value: String) -> Result<Self, ContentError> {
        if value.trim().is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ConnectionId の生成ファクトリ（UUID v4）
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4().to_string())
    }
}

/// メッセージ本文
///
/// 前後の空白をトリムした上で保持します。トリム後に空になる本文、および
/// 最大長を超える本文は不正です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// 新しい MessageContent を作成
    pub fn new(value: String) -> Result<Self, ContentError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ContentError::Empty);
        }
        if trimmed.chars().count() > MAX_MESSAGE_CONTENT_CHARS {
            return Err(ContentError::TooLong(MAX_MESSAGE_CONTENT_CHARS));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// タイムスタンプ（UTC ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
