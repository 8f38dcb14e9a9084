//! Entity 定義
//!
//! ドメイン層のエンティティ。Identity は接続時に一度だけ解決され、
//! Connection の生存期間中は不変です。

use std::collections::HashSet;

use super::value_object::{ConnectionId, MessageContent, MessageId, RoomId, Timestamp, UserId, Username};

/// 認証済みユーザーの公開アイデンティティ
///
/// Session Authenticator が解決し、Connection に読み取り専用で紐付きます。
/// パスワード等の非公開フィールドはドメインに持ち込みません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: Username,
}

impl Identity {
    pub fn new(user_id: UserId, username: Username) -> Self {
        Self { user_id, username }
    }
}

/// 認証済みのライブ接続
///
/// 1 つの Connection はちょうど 1 つの Identity を持ちます。逆に 1 つの
/// Identity は複数の Connection を同時に持ち得ます（マルチデバイス）。
#[derive(Debug, Clone)]
pub struct Connection {
    pub connection_id: ConnectionId,
    pub identity: Identity,
    /// join 済みのルーム集合（単一値ではなく集合。クライアントが leave せずに
    /// 別ルームへ join しても両方のメンバーシップが有効なまま残る）
    pub joined_rooms: HashSet<RoomId>,
    pub connected_at: Timestamp,
    pub last_activity: Timestamp,
}

impl Connection {
    pub fn new(connection_id: ConnectionId, identity: Identity, connected_at: Timestamp) -> Self {
        Self {
            connection_id,
            identity,
            joined_rooms: HashSet::new(),
            connected_at,
            last_activity: connected_at,
        }
    }
}

/// チャットルーム
///
/// ルームの存在は永続ストアが正。Connection Manager はルームを作成せず、
/// Room Registry 経由で存在確認のみ行います。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub room_id: RoomId,
    pub name: String,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(room_id: RoomId, name: String, created_by: UserId, created_at: Timestamp) -> Self {
        Self {
            room_id,
            name,
            created_by,
            created_at,
        }
    }
}

/// チャットメッセージ
///
/// 作成後は不変。例外は作成者自身による編集操作で、その場合のみ
/// `content` が更新され `edited` が立ちます。ルーム内の順序は
/// `created_at`、同時刻は挿入順で決まります。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub message_id: MessageId,
    pub room_id: RoomId,
    pub content: MessageContent,
    pub sender_id: UserId,
    pub created_at: Timestamp,
    pub edited: bool,
}

impl ChatMessage {
    pub fn new(
        message_id: MessageId,
        room_id: RoomId,
        content: MessageContent,
        sender_id: UserId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            message_id,
            room_id,
            content,
            sender_id,
            created_at,
            edited: false,
        }
    }
}
