//! InMemory Message Store 実装
//!
//! ドメイン層が定義する MessageStore trait の具体的な実装。
//! ルームごとの Vec を追記専用ログとして使用します。ID とタイムスタンプの
//! 採番はストア側が行い、同一ルームへの並行書き込みは内部ロックで
//! 直列化されます。created_at が同時刻のメッセージは挿入順が保たれます。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use irori_shared::time::Clock;

use crate::domain::{
    ChatMessage, MessageContent, MessageId, MessageIdFactory, MessageStore, RepositoryError,
    RoomId, Timestamp, UserId,
};

/// インメモリ Message Store 実装
pub struct InMemoryMessageStore {
    clock: Arc<dyn Clock>,
    /// room_id → 永続順のメッセージログ
    messages: Mutex<HashMap<RoomId, Vec<ChatMessage>>>,
}

impl InMemoryMessageStore {
    /// 新しい InMemoryMessageStore を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            messages: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create_message(
        &self,
        room_id: RoomId,
        content: MessageContent,
        sender_id: UserId,
    ) -> Result<ChatMessage, RepositoryError> {
        let message = ChatMessage::new(
            MessageIdFactory::generate(),
            room_id.clone(),
            content,
            sender_id,
            Timestamp::new(self.clock.now_utc_millis()),
        );

        let mut messages = self.messages.lock().await;
        messages.entry(room_id).or_default().push(message.clone());
        Ok(message)
    }

    async fn get_message(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
    ) -> Result<ChatMessage, RepositoryError> {
        let messages = self.messages.lock().await;
        messages
            .get(room_id)
            .and_then(|log| log.iter().find(|m| &m.message_id == message_id))
            .cloned()
            .ok_or(RepositoryError::MessageNotFound)
    }

    async fn update_message(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
        content: MessageContent,
    ) -> Result<ChatMessage, RepositoryError> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .get_mut(room_id)
            .and_then(|log| log.iter_mut().find(|m| &m.message_id == message_id))
            .ok_or(RepositoryError::MessageNotFound)?;

        message.content = content;
        message.edited = true;
        Ok(message.clone())
    }

    async fn delete_message(
        &self,
        message_id: &MessageId,
        room_id: &RoomId,
    ) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        let log = messages
            .get_mut(room_id)
            .ok_or(RepositoryError::MessageNotFound)?;
        let before = log.len();
        log.retain(|m| &m.message_id != message_id);
        if log.len() == before {
            return Err(RepositoryError::MessageNotFound);
        }
        Ok(())
    }

    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(messages.get(room_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irori_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryMessageStore の作成・取得・更新・削除・一覧
    // - 採番（ID・タイムスタンプ）がストア側で行われること
    // - ルーム違いの ID 指定が MessageNotFound になること
    //
    // 【なぜこのテストが必要か】
    // - Message Store はメッセージライフサイクルの正であり、
    //   編集・削除の往復（§ラウンドトリップ）を支える
    // ========================================

    fn store() -> InMemoryMessageStore {
        InMemoryMessageStore::new(Arc::new(FixedClock::new(1_700_000_000_000)))
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn content(text: &str) -> MessageContent {
        MessageContent::new(text.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_message_assigns_id_and_timestamp() {
        // テスト項目: 作成時にストアが ID とタイムスタンプを採番する
        // given (前提条件):
        let store = store();

        // when (操作):
        let message = store
            .create_message(room("general"), content("hi"), user("u1"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!message.message_id.as_str().is_empty());
        assert_eq!(message.created_at, Timestamp::new(1_700_000_000_000));
        assert!(!message.edited);
    }

    #[tokio::test]
    async fn test_list_messages_preserves_insertion_order() {
        // テスト項目: 同時刻のメッセージでも挿入順が保たれる
        // given (前提条件): FixedClock のため全メッセージが同時刻になる
        let store = store();
        store
            .create_message(room("general"), content("first"), user("u1"))
            .await
            .unwrap();
        store
            .create_message(room("general"), content("second"), user("u1"))
            .await
            .unwrap();
        store
            .create_message(room("general"), content("third"), user("u2"))
            .await
            .unwrap();

        // when (操作):
        let log = store.list_messages(&room("general")).await.unwrap();

        // then (期待する結果):
        let texts: Vec<&str> = log.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_update_message_round_trip() {
        // テスト項目: 編集後の一覧は新しい本文と edited=true を返す
        // given (前提条件):
        let store = store();
        let message = store
            .create_message(room("general"), content("hi"), user("u1"))
            .await
            .unwrap();

        // when (操作):
        let updated = store
            .update_message(&message.message_id, &room("general"), content("hello"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(updated.content.as_str(), "hello");
        assert!(updated.edited);

        let log = store.list_messages(&room("general")).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].content.as_str(), "hello");
        assert!(log[0].edited);
    }

    #[tokio::test]
    async fn test_update_message_wrong_room_is_not_found() {
        // テスト項目: ルーム違いの ID 指定は MessageNotFound になる
        // given (前提条件):
        let store = store();
        let message = store
            .create_message(room("general"), content("hi"), user("u1"))
            .await
            .unwrap();

        // when (操作):
        let result = store
            .update_message(&message.message_id, &room("random"), content("hello"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::MessageNotFound));
    }

    #[tokio::test]
    async fn test_delete_message_removes_from_list() {
        // テスト項目: 削除したメッセージは一覧から消える
        // given (前提条件):
        let store = store();
        let message = store
            .create_message(room("general"), content("hi"), user("u1"))
            .await
            .unwrap();

        // when (操作):
        store
            .delete_message(&message.message_id, &room("general"))
            .await
            .unwrap();

        // then (期待する結果):
        let log = store.list_messages(&room("general")).await.unwrap();
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_message_is_not_found() {
        // テスト項目: 存在しないメッセージの削除は MessageNotFound になる
        // given (前提条件):
        let store = store();

        // when (操作):
        let result = store
            .delete_message(&MessageIdFactory::generate(), &room("general"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::MessageNotFound));
    }

    #[tokio::test]
    async fn test_get_message_success() {
        // テスト項目: 作成したメッセージを ID とルームで取得できる
        // given (前提条件):
        let store = store();
        let message = store
            .create_message(room("general"), content("hi"), user("u1"))
            .await
            .unwrap();

        // when (操作):
        let fetched = store
            .get_message(&message.message_id, &room("general"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(fetched, message);
    }
}
