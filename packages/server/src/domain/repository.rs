//! Repository trait 定義
//!
//! ハブがチャットメッセージを引き渡す永続化先のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DisplayName, Message, RepositoryError, RoomId, UserId};

/// One stored chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLogEntry {
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub sender_name: DisplayName,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatLogEntry {
    pub fn from_message(message: &Message, room_id: &RoomId) -> Self {
        Self {
            room_id: room_id.clone(),
            sender_id: message.sender_id.clone(),
            sender_name: message.sender_name.clone(),
            content: message.content.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// Chat log repository trait
///
/// 書き込みは fire-and-forget で呼ばれるため、失敗は呼び出し側でログに残すだけで
/// 配信やコネクションの寿命には影響しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatLogRepository: Send + Sync {
    /// チャットメッセージを保存
    async fn save(&self, message: &Message, room_id: &RoomId) -> Result<(), RepositoryError>;

    /// Room のチャット履歴を古い順に取得
    async fn list(&self, room_id: &RoomId) -> Result<Vec<ChatLogEntry>, RepositoryError>;
}
