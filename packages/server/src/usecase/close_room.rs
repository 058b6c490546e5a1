//! UseCase: Room のクローズ通知
//!
//! Room 管理側から呼ばれ、接続中の全メンバーに `room_closed` を配信する。
//! 受け取ったクライアントが自分でセッションを終了する。

use std::sync::Arc;

use kyodo_shared::time::Clock;

use crate::{
    domain::{Identity, Message, RoomId},
    infrastructure::hub::HubRegistry,
};

use super::error::CloseRoomError;

/// Room クローズ通知のユースケース
pub struct CloseRoomUseCase {
    registry: Arc<HubRegistry>,
    clock: Arc<dyn Clock>,
}

impl CloseRoomUseCase {
    pub fn new(registry: Arc<HubRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Broadcast the closure notice.
    ///
    /// Returns `Ok(false)` when the room has no hub, i.e. nobody has ever
    /// connected to it in this process.
    pub async fn execute(
        &self,
        requested_by: &Identity,
        room_id: RoomId,
    ) -> Result<bool, CloseRoomError> {
        if !requested_by.is_admin() {
            return Err(CloseRoomError::Forbidden);
        }

        let Some(hub) = self.registry.get(&room_id).await else {
            tracing::info!("Room '{}' has no hub, nothing to notify", room_id);
            return Ok(false);
        };

        let notice =
            Message::room_closed(&requested_by.user_id, room_id.clone(), self.clock.now());
        hub.broadcast(notice).await?;
        tracing::info!("Room '{}' closed by '{}'", room_id, requested_by.user_id);

        Ok(true)
    }
}
