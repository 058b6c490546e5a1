//! UseCase: 稼働中の Room 一覧

use std::sync::Arc;

use crate::{
    domain::RoomId,
    infrastructure::hub::{HubRegistry, MemberInfo},
};

/// A room with a live hub and its current members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub members: Vec<MemberInfo>,
}

/// Room 一覧取得のユースケース
pub struct ListRoomsUseCase {
    registry: Arc<HubRegistry>,
}

impl ListRoomsUseCase {
    pub fn new(registry: Arc<HubRegistry>) -> Self {
        Self { registry }
    }

    /// Snapshot every room that has a hub, sorted by room id.
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        let mut snapshots = Vec::new();
        for room_id in self.registry.room_ids().await {
            let Some(hub) = self.registry.get(&room_id).await else {
                continue;
            };
            match hub.members().await {
                Ok(mut members) => {
                    members.sort_by(|a, b| a.user_id.as_str().cmp(b.user_id.as_str()));
                    snapshots.push(RoomSnapshot { room_id, members });
                }
                Err(e) => tracing::warn!("Skipping room '{}': {}", room_id, e),
            }
        }
        snapshots
    }
}
