//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 技術的負債
//!
//! 現在、ドメインモデル（`Room`）を直接ストレージとして使用しています。
//! これは InMemory 実装では許容される妥協ですが、将来 PostgreSQL などの
//! DBMS を実装する際は、DB Row → DTO → ドメインモデルの変換層が必要に
//! なります。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, Room, RoomId, RoomRegistry};

/// インメモリ Room Registry 実装
///
/// ルーム作成は永続ストア側（本来は REST の CRUD コラボレータ）の責務の
/// ため trait には含めず、seed 用の固有メソッドとして提供します。
pub struct InMemoryRoomRegistry {
    /// room_id → Room
    rooms: Mutex<HashMap<RoomId, Room>>,
}

impl InMemoryRoomRegistry {
    /// 新しい InMemoryRoomRegistry を作成
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// ルームを追加（起動時 seed・テスト用）
    pub async fn add_room(&self, room: Room) {
        let mut rooms = self.rooms.lock().await;
        rooms.insert(room.room_id.clone(), room);
    }
}

impl Default for InMemoryRoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, RepositoryError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.contains_key(room_id))
    }
}
