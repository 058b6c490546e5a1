//! WebSocket message schema.

use serde::{Deserialize, Serialize};

use crate::domain::MessageKind;

/// What a client may send. Any sender, timestamp or room fields it includes
/// are ignored; the server fills those in from the connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    pub r#type: MessageKind,
    #[serde(default)]
    pub content: String,
}

/// What every member receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub r#type: MessageKind,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    /// RFC 3339, set by the server
    pub timestamp: String,
    pub room_id: String,
}
