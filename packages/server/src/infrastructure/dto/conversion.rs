//! Conversion logic between DTOs and domain entities.

use irori_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, Identity, RoomId, UserId};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl dto::MessageDto {
    /// 永続化済みメッセージを、sender を公開アイデンティティに展開した
    /// ワイヤ表現へ変換する
    pub fn from_message(message: &ChatMessage, sender: &Identity) -> Self {
        Self {
            message_id: message.message_id.as_str().to_string(),
            room_id: message.room_id.as_str().to_string(),
            text: message.content.as_str().to_string(),
            sender: dto::SenderDto {
                id: sender.user_id.as_str().to_string(),
                username: sender.username.as_str().to_string(),
            },
            created_at: timestamp_to_rfc3339(message.created_at.value()),
            edited: message.edited,
        }
    }
}

impl dto::UserTypingPayload {
    pub fn from_identity(identity: &Identity, room_id: &RoomId) -> Self {
        Self {
            user_id: identity.user_id.as_str().to_string(),
            username: identity.username.as_str().to_string(),
            room_id: room_id.as_str().to_string(),
        }
    }
}

impl dto::UserStoppedTypingPayload {
    pub fn from_user(user_id: &UserId, room_id: &RoomId) -> Self {
        Self {
            user_id: user_id.as_str().to_string(),
            room_id: room_id.as_str().to_string(),
        }
    }
}
