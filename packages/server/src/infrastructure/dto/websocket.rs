//! WebSocket ワイヤプロトコル定義
//!
//! イベント名とペイロード形状は互換性のため固定です。イベントは
//! `{"event": <名前>, "data": <ペイロード>}` の閉じたタグ付きユニオンで、
//! 未知のイベント名・未知のフィールドはデコードエラーとして弾かれます
//! （部分的なデータを黙って受け入れない）。

use serde::{Deserialize, Serialize};

/// クライアント → サーバーのイベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// ルームへの join 要求（data はルーム ID 文字列）
    JoinRoom(String),
    /// ルームからの leave 要求（data はルーム ID 文字列）
    LeaveRoom(String),
    /// メッセージ送信
    SendMessage(SendMessagePayload),
    /// メッセージ編集
    EditMessage(EditMessagePayload),
    /// メッセージ削除
    DeleteMessage(DeleteMessagePayload),
    /// タイピング開始
    Typing(TypingPayload),
    /// タイピング終了
    StopTyping(TypingPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessagePayload {
    pub room_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EditMessagePayload {
    pub message_id: String,
    pub room_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteMessagePayload {
    pub message_id: String,
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypingPayload {
    pub room_id: String,
}

/// サーバー → クライアントのイベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// 新規メッセージ（sender は公開アイデンティティに展開済み）
    NewMessage(MessageDto),
    /// メッセージ更新
    MessageUpdate(MessageUpdatePayload),
    /// メッセージ削除（data はメッセージ ID 文字列）
    MessageDelete(String),
    /// タイピング中ユーザーの通知
    UserTyping(UserTypingPayload),
    /// タイピング終了の通知
    UserStoppedTyping(UserStoppedTypingPayload),
    /// 操作エラー（要求元のコネクションにのみ送られる）
    Error(ErrorPayload),
}

/// ワイヤ上のメッセージ表現
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub message_id: String,
    pub room_id: String,
    pub text: String,
    pub sender: SenderDto,
    /// RFC 3339 (UTC)
    pub created_at: String,
    pub edited: bool,
}

/// sender の公開アイデンティティ（パスワード等の非公開フィールドは含まない）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderDto {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdatePayload {
    pub message_id: String,
    pub updated_message: MessageDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypingPayload {
    pub user_id: String,
    pub username: String,
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStoppedTypingPayload {
    pub user_id: String,
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
}
