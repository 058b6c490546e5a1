use thiserror::Error;

use crate::domain::RoomId;

/// Errors returned by hub handles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// The coordination loop for the room is no longer running
    #[error("hub for room '{0}' is not running")]
    Closed(RoomId),
}
