//! TypingTracker 実装
//!
//! ## 責務
//!
//! - ルームごとの「今タイピング中のユーザー」集合の管理
//!
//! ## 設計ノート
//!
//! この状態は一切永続化されません。プロセス再起動で空から再構築されます。
//! エントリが消えるのは明示的な stop、期限切れ、切断時のクリアの 3 経路
//! です。
//!
//! エントリは deadline を持ち、typing イベントのたびに更新されます。
//! 期限切れエントリの掃き出し（sweep_expired）は UI 層の定期タスクが
//! 呼び出します。クライアントが stopTyping を送らずに消えた場合でも、
//! 表示の古さは TTL で抑えられます。

use std::collections::HashMap;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::domain::{Identity, RoomId, UserId, Username};

/// typing イベントの更新が途絶えてからエントリが期限切れになるまでの時間
pub const DEFAULT_TYPING_TTL: Duration = Duration::from_secs(6);

struct TypingEntry {
    username: Username,
    deadline: Instant,
}

/// ルームごとのタイピング中ユーザー集合
pub struct TypingTracker {
    ttl: Duration,
    /// room_id → (user_id → エントリ)
    rooms: Mutex<HashMap<RoomId, HashMap<UserId, TypingEntry>>>,
}

impl TypingTracker {
    /// 既定の TTL で作成
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TYPING_TTL)
    }

    /// TTL を指定して作成
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// タイピング開始（冪等な集合挿入。deadline は毎回更新される）
    pub async fn start(&self, room_id: RoomId, identity: &Identity) {
        let mut rooms = self.rooms.lock().await;
        let entry = TypingEntry {
            username: identity.username.clone(),
            deadline: Instant::now() + self.ttl,
        };
        rooms
            .entry(room_id)
            .or_default()
            .insert(identity.user_id.clone(), entry);
    }

    /// タイピング終了（冪等な集合削除。削除が起きた場合 true）
    pub async fn stop(&self, room_id: &RoomId, user_id: &UserId) -> bool {
        let mut rooms = self.rooms.lock().await;
        let Some(users) = rooms.get_mut(room_id) else {
            return false;
        };
        let removed = users.remove(user_id).is_some();
        if users.is_empty() {
            rooms.remove(room_id);
        }
        removed
    }

    /// 切断時のクリア。ユーザーのエントリを全ルームから取り除き、
    /// エントリが存在していたルームの一覧を返す
    pub async fn clear_user(&self, user_id: &UserId) -> Vec<RoomId> {
        let mut rooms = self.rooms.lock().await;
        let mut cleared = Vec::new();
        rooms.retain(|room_id, users| {
            if users.remove(user_id).is_some() {
                cleared.push(room_id.clone());
            }
            !users.is_empty()
        });
        cleared
    }

    /// 期限切れエントリを取り除き、(ルーム, ユーザー) の一覧を返す
    pub async fn sweep_expired(&self) -> Vec<(RoomId, UserId)> {
        let now = Instant::now();
        let mut rooms = self.rooms.lock().await;
        let mut expired = Vec::new();
        rooms.retain(|room_id, users| {
            users.retain(|user_id, entry| {
                if entry.deadline <= now {
                    expired.push((room_id.clone(), user_id.clone()));
                    false
                } else {
                    true
                }
            });
            !users.is_empty()
        });
        expired
    }

    /// ルームでタイピング中のユーザー一覧
    pub async fn typing_users(&self, room_id: &RoomId) -> Vec<(UserId, Username)> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .map(|users| {
                users
                    .iter()
                    .map(|(user_id, entry)| (user_id.clone(), entry.username.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for TypingTracker {
    fn default() -> Self {
        Self::new()
    }
}
