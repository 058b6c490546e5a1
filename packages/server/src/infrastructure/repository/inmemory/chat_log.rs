//! InMemory ChatLog Repository 実装
//!
//! ドメイン層が定義する ChatLogRepository trait の具体的な実装。
//! Room ID ごとのリングバッファをインメモリ DB として使用します。
//! 上限を超えると古いものから捨て、プロセス再起動で履歴は失われます。

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatLogEntry, ChatLogRepository, Message, RepositoryError, RoomId};

/// Entries kept per room by [`InMemoryChatLogRepository::new`].
pub const DEFAULT_MAX_ENTRIES_PER_ROOM: usize = 1000;

/// インメモリ ChatLog Repository 実装
#[derive(Debug)]
pub struct InMemoryChatLogRepository {
    entries: Mutex<HashMap<RoomId, VecDeque<ChatLogEntry>>>,
    max_entries_per_room: usize,
}

impl Default for InMemoryChatLogRepository {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES_PER_ROOM)
    }
}

impl InMemoryChatLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max_entries_per_room` entries per room, dropping the oldest.
    pub fn with_capacity(max_entries_per_room: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries_per_room: max_entries_per_room.max(1),
        }
    }
}

#[async_trait]
impl ChatLogRepository for InMemoryChatLogRepository {
    async fn save(&self, message: &Message, room_id: &RoomId) -> Result<(), RepositoryError> {
        if !message.is_chat() {
            return Err(RepositoryError::UnsupportedKind(message.kind.to_string()));
        }

        let mut entries = self.entries.lock().await;
        let log = entries.entry(room_id.clone()).or_default();
        if log.len() == self.max_entries_per_room {
            log.pop_front();
        }
        log.push_back(ChatLogEntry::from_message(message, room_id));
        Ok(())
    }

    async fn list(&self, room_id: &RoomId) -> Result<Vec<ChatLogEntry>, RepositoryError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(room_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default())
    }
}
