//! ConnectionManager 実装
//!
//! ## 責務
//!
//! - ライブコネクション表の管理（register / unregister）
//! - ルームごとのメンバーシップインデックスの管理（join / leave）
//!
//! ## 設計ノート
//!
//! メンバーシップはトランスポートのグルーピング機構とは独立した
//! ドメインレベルのインデックス（room_id → ConnectionId 集合）として
//! 保持します。サービス起動時に明示的に構築され、Broadcast Router と
//! Presence Tracker へ注入されます（プロセス全体のグローバル状態には
//! しない）。
//!
//! 変更はロック解放と同時に Broadcast Router から見えます。バッファリング
//! や遅延反映はありません。

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use crate::domain::{Connection, ConnectionId, Identity, RoomId, Timestamp};

#[derive(Default)]
struct Inner {
    /// ConnectionId → Connection
    connections: HashMap<ConnectionId, Connection>,
    /// room_id → そのルームに join 中の ConnectionId 集合
    room_members: HashMap<RoomId, HashSet<ConnectionId>>,
}

/// ライブコネクション表とルームメンバーシップインデックス
pub struct ConnectionManager {
    inner: Mutex<Inner>,
}

impl ConnectionManager {
    /// 新しい ConnectionManager を作成
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// 認証済みコネクションを登録
    pub async fn register(&self, connection: Connection) {
        let mut inner = self.inner.lock().await;
        tracing::debug!(
            "Connection '{}' registered for user '{}'",
            connection.connection_id.as_str(),
            connection.identity.username.as_str()
        );
        inner
            .connections
            .insert(connection.connection_id.clone(), connection);
    }

    /// コネクションを登録解除し、全ルームのメンバーシップから取り除く
    ///
    /// 切断時点の Connection（join 済みルーム込み）を返します。
    /// 未登録のコネクションに対しては None（冪等）。
    pub async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let mut inner = self.inner.lock().await;
        let connection = inner.connections.remove(connection_id)?;

        for room_id in &connection.joined_rooms {
            if let Some(members) = inner.room_members.get_mut(room_id) {
                members.remove(connection_id);
                if members.is_empty() {
                    inner.room_members.remove(room_id);
                }
            }
        }

        tracing::debug!(
            "Connection '{}' unregistered from {} room(s)",
            connection_id.as_str(),
            connection.joined_rooms.len()
        );
        Some(connection)
    }

    /// コネクションをルームのメンバーに加える
    ///
    /// メンバーシップは集合であり、別ルームへの join が既存の join を
    /// 無効化することはありません。未登録のコネクションは false。
    pub async fn join_room(&self, connection_id: &ConnectionId, room_id: RoomId) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(connection) = inner.connections.get_mut(connection_id) else {
            return false;
        };
        connection.joined_rooms.insert(room_id.clone());
        inner
            .room_members
            .entry(room_id)
            .or_default()
            .insert(connection_id.clone());
        true
    }

    /// コネクションをルームのメンバーから外す（冪等）
    pub async fn leave_room(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        let mut inner = self.inner.lock().await;
        if let Some(connection) = inner.connections.get_mut(connection_id) {
            connection.joined_rooms.remove(room_id);
        }
        if let Some(members) = inner.room_members.get_mut(room_id) {
            members.remove(connection_id);
            if members.is_empty() {
                inner.room_members.remove(room_id);
            }
        }
    }

    /// ルームの現在のメンバー（ConnectionId）を取得
    pub async fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let inner = self.inner.lock().await;
        inner
            .room_members
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// コネクションがルームのメンバーかどうか
    pub async fn is_member(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let inner = self.inner.lock().await;
        inner
            .room_members
            .get(room_id)
            .is_some_and(|members| members.contains(connection_id))
    }

    /// コネクションに紐付く Identity を取得
    pub async fn identity_of(&self, connection_id: &ConnectionId) -> Option<Identity> {
        let inner = self.inner.lock().await;
        inner
            .connections
            .get(connection_id)
            .map(|connection| connection.identity.clone())
    }

    /// 受信イベントに合わせて last_activity を更新
    pub async fn touch(&self, connection_id: &ConnectionId, at: Timestamp) {
        let mut inner = self.inner.lock().await;
        if let Some(connection) = inner.connections.get_mut(connection_id) {
            connection.last_activity = at;
        }
    }

    /// 登録中のコネクション数
    pub async fn count_connections(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
