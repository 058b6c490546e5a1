//! Process-wide mapping from room id to hub.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::RoomId;

use super::Hub;

/// Resolves room ids to hubs, starting a hub on first access.
///
/// Created once at startup and injected wherever rooms are resolved. The lock
/// only guards lookup-or-create; steady-state traffic goes through the
/// resolved hub's own intake. Entries are never removed, so a room's hub
/// lives as long as the process.
#[derive(Debug)]
pub struct HubRegistry {
    hubs: Mutex<HashMap<RoomId, Hub>>,
    intake_capacity: usize,
}

impl HubRegistry {
    pub fn new(intake_capacity: usize) -> Self {
        Self {
            hubs: Mutex::new(HashMap::new()),
            intake_capacity,
        }
    }

    /// Return the hub for `room_id`, creating and starting it if needed.
    ///
    /// At most one hub ever exists per room id, even when several callers
    /// resolve the same new room concurrently.
    pub async fn resolve(&self, room_id: &RoomId) -> Hub {
        let mut hubs = self.hubs.lock().await;
        if let Some(hub) = hubs.get(room_id) {
            return hub.clone();
        }

        let hub = Hub::start(room_id.clone(), self.intake_capacity);
        hubs.insert(room_id.clone(), hub.clone());
        hub
    }

    /// Return the hub for `room_id` without creating one.
    pub async fn get(&self, room_id: &RoomId) -> Option<Hub> {
        let hubs = self.hubs.lock().await;
        hubs.get(room_id).cloned()
    }

    /// Rooms that currently have a hub, sorted by id.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        let hubs = self.hubs.lock().await;
        let mut room_ids: Vec<RoomId> = hubs.keys().cloned().collect();
        room_ids.sort();
        room_ids
    }
}
