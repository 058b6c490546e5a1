//! Conversion logic between DTOs and domain entities.

use kyodo_shared::time::to_rfc3339_millis;

use crate::{
    domain::{ChatLogEntry, Message},
    infrastructure::{
        dto::{http, websocket},
        hub::MemberInfo,
    },
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Message> for websocket::OutboundMessage {
    fn from(message: &Message) -> Self {
        Self {
            r#type: message.kind,
            sender_id: message.sender_id.as_str().to_string(),
            sender_name: message.sender_name.as_str().to_string(),
            content: message.content.clone(),
            timestamp: to_rfc3339_millis(message.timestamp),
            room_id: message.room_id.as_str().to_string(),
        }
    }
}

impl From<MemberInfo> for http::MemberDto {
    fn from(info: MemberInfo) -> Self {
        Self {
            connection_id: info.connection_id.to_string(),
            user_id: info.user_id.into_string(),
            display_name: info.display_name.into_string(),
        }
    }
}

impl From<ChatLogEntry> for http::ChatLogEntryDto {
    fn from(entry: ChatLogEntry) -> Self {
        Self {
            room_id: entry.room_id.into_string(),
            sender_id: entry.sender_id.into_string(),
            sender_name: entry.sender_name.into_string(),
            content: entry.content,
            timestamp: to_rfc3339_millis(entry.timestamp),
        }
    }
}
