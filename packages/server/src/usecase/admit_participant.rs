//! UseCase: コネクションの受け入れ
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AdmitParticipantUseCase の認証・Room ID 検証・ハブへの登録
//!
//! ### なぜこのテストが必要か
//! - 認証に失敗した接続はコネクション状態を一切作らずに拒否する必要がある
//! - 入室通知 → 登録 の順序により、本人には自分の入室通知が届かない
//!
//! ### どのような状況を想定しているか
//! - 正常系：コンテキスト由来の Identity / クエリトークンでの受け入れ
//! - 異常系：トークン欠落・不正・期限切れ、空の Room ID

use std::sync::Arc;

use kyodo_shared::time::Clock;
use tokio::sync::mpsc;

use crate::{
    domain::{AuthError, ConnectionId, Identity, IdentityVerifier, Message, RoomId},
    infrastructure::hub::{HubRegistry, Member, WeakHub},
};

use super::error::AdmissionError;

/// An admitted connection, registered with its room's hub.
#[derive(Debug)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub identity: Identity,
    pub room_id: RoomId,
    /// Used for broadcast and unregister, never for keeping the hub alive
    pub hub: WeakHub,
    /// Receiving end of the connection's outbound queue
    pub outbound: mpsc::Receiver<Message>,
}

/// コネクション受け入れのユースケース
pub struct AdmitParticipantUseCase {
    verifier: Arc<dyn IdentityVerifier>,
    registry: Arc<HubRegistry>,
    clock: Arc<dyn Clock>,
    queue_capacity: usize,
}

impl AdmitParticipantUseCase {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        registry: Arc<HubRegistry>,
        clock: Arc<dyn Clock>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            verifier,
            registry,
            clock,
            queue_capacity,
        }
    }

    /// Resolve the caller's identity.
    ///
    /// An identity already established by upstream middleware wins; otherwise
    /// the `token` query parameter is verified.
    pub fn authenticate(
        &self,
        context_identity: Option<Identity>,
        query_token: Option<&str>,
    ) -> Result<Identity, AdmissionError> {
        if let Some(identity) = context_identity {
            return Ok(identity);
        }

        let token = query_token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;
        Ok(self.verifier.verify(token)?)
    }

    pub fn parse_room_id(raw: String) -> Result<RoomId, AdmissionError> {
        RoomId::new(raw).map_err(AdmissionError::InvalidRoomId)
    }

    /// 参加者を受け入れる
    ///
    /// 1. Room のハブを取得（無ければ作成して起動）
    /// 2. 入室通知をブロードキャスト
    /// 3. ハブに登録
    pub async fn execute(
        &self,
        identity: Identity,
        room_id: RoomId,
    ) -> Result<Participant, AdmissionError> {
        let hub = self.registry.resolve(&room_id).await;

        let connection_id = ConnectionId::generate();
        let (member, outbound) = Member::new(connection_id, &identity, self.queue_capacity);

        hub.broadcast(Message::joined(&identity, room_id.clone(), self.clock.now()))
            .await?;
        hub.register(member).await?;

        tracing::info!(
            "User '{}' admitted to room '{}' as connection {}",
            identity.user_id,
            room_id,
            connection_id
        );

        Ok(Participant {
            connection_id,
            identity,
            room_id,
            hub: hub.downgrade(),
            outbound,
        })
    }
}
