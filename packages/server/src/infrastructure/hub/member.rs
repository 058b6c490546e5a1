//! Hub-side view of one connection.

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::{ConnectionId, DisplayName, Identity, Message, UserId};

/// A registered connection as seen by the hub: who it is and where its
/// outbound messages go.
///
/// The hub owns the only sender of the outbound queue, so dropping a
/// `Member` closes the queue and lets the connection's writer finish.
#[derive(Debug)]
pub struct Member {
    id: ConnectionId,
    user_id: UserId,
    display_name: DisplayName,
    outbound: mpsc::Sender<Message>,
}

impl Member {
    /// Create a member and the receiving end of its bounded outbound queue.
    pub fn new(
        id: ConnectionId,
        identity: &Identity,
        queue_capacity: usize,
    ) -> (Self, mpsc::Receiver<Message>) {
        let (outbound, receiver) = mpsc::channel(queue_capacity.max(1));
        let member = Self {
            id,
            user_id: identity.user_id.clone(),
            display_name: identity.display_name.clone(),
            outbound,
        };
        (member, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn info(&self) -> MemberInfo {
        MemberInfo {
            connection_id: self.id,
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
        }
    }

    /// Non-blocking enqueue onto the outbound queue.
    pub(super) fn try_deliver(&self, message: Message) -> Result<(), TrySendError<Message>> {
        self.outbound.try_send(message)
    }
}

/// Snapshot of a member, safe to hand out of the coordination loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub display_name: DisplayName,
}
