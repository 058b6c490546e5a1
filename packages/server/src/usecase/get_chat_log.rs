//! UseCase: チャット履歴の取得

use std::sync::Arc;

use crate::domain::{ChatLogEntry, ChatLogRepository, RepositoryError, RoomId};

/// チャット履歴取得のユースケース
pub struct GetChatLogUseCase {
    chat_log: Arc<dyn ChatLogRepository>,
}

impl GetChatLogUseCase {
    pub fn new(chat_log: Arc<dyn ChatLogRepository>) -> Self {
        Self { chat_log }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<Vec<ChatLogEntry>, RepositoryError> {
        self.chat_log.list(room_id).await
    }
}
