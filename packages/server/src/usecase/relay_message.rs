//! UseCase: メッセージ中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() メソッド
//! - 送信者情報とタイムスタンプのサーバー側での上書き
//! - チャットのみ永続化され、永続化の失敗は配信に影響しないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：chat / edit の中継
//! - 異常系：永続化の失敗、ハブの停止

use std::sync::Arc;

use kyodo_shared::time::Clock;

use crate::{
    domain::{ChatLogRepository, Identity, Message, MessageKind},
    infrastructure::hub::Hub,
};

use super::error::RelayError;

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    chat_log: Arc<dyn ChatLogRepository>,
    clock: Arc<dyn Clock>,
}

impl RelayMessageUseCase {
    pub fn new(chat_log: Arc<dyn ChatLogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { chat_log, clock }
    }

    /// Stamp client content with the sender and a server timestamp, then hand
    /// it to the hub. Chat messages are also written to the chat log without
    /// waiting for the outcome.
    ///
    /// `room_closed` is reserved for [`CloseRoomUseCase`](super::CloseRoomUseCase)
    /// and is refused here.
    pub async fn execute(
        &self,
        hub: &Hub,
        sender: &Identity,
        kind: MessageKind,
        content: String,
    ) -> Result<Message, RelayError> {
        if kind == MessageKind::RoomClosed {
            return Err(RelayError::ReservedKind(kind));
        }

        let message = Message::from_client(
            kind,
            content,
            sender,
            hub.room_id().clone(),
            self.clock.now(),
        );

        if message.is_chat() {
            self.persist(message.clone());
        }
        hub.broadcast(message.clone()).await?;

        Ok(message)
    }

    fn persist(&self, message: Message) {
        let chat_log = self.chat_log.clone();
        tokio::spawn(async move {
            if let Err(e) = chat_log.save(&message, &message.room_id).await {
                tracing::error!(
                    "Error saving chat message from '{}' in room '{}': {}",
                    message.sender_id,
                    message.room_id,
                    e
                );
            }
        });
    }
}
