//! The unit of data exchanged over a room connection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DisplayName, Identity, RoomId, UserId};

/// Content broadcast when an administrator closes a room.
pub const ROOM_CLOSED_NOTICE: &str = "Room has been closed by admin. You will be logged out.";

/// Kind of message flowing through a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Code editing operation (opaque delta)
    Edit,
    /// Chat message
    Chat,
    /// Room closed by its administrator
    RoomClosed,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Edit => "edit",
            MessageKind::Chat => "chat",
            MessageKind::RoomClosed => "room_closed",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message after server-side stamping.
///
/// Sender identity and timestamp are always filled in by the server; nothing a
/// client sends for those fields survives ingress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub sender_id: UserId,
    pub sender_name: DisplayName,
    /// Chat body or edit delta, never interpreted by the hub
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub room_id: RoomId,
}

impl Message {
    /// Stamp client supplied content with the authenticated sender.
    pub fn from_client(
        kind: MessageKind,
        content: String,
        sender: &Identity,
        room_id: RoomId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            sender_id: sender.user_id.clone(),
            sender_name: sender.display_name.clone(),
            content,
            timestamp,
            room_id,
        }
    }

    /// Synthetic chat notice announcing that `identity` entered the room.
    pub fn joined(identity: &Identity, room_id: RoomId, timestamp: DateTime<Utc>) -> Self {
        Self::from_client(
            MessageKind::Chat,
            format!("{} joined the room", identity.display_name),
            identity,
            room_id,
            timestamp,
        )
    }

    /// Notice telling every member that the room is closed.
    pub fn room_closed(closed_by: &UserId, room_id: RoomId, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: MessageKind::RoomClosed,
            sender_id: closed_by.clone(),
            sender_name: DisplayName::system(),
            content: ROOM_CLOSED_NOTICE.to_string(),
            timestamp,
            room_id,
        }
    }

    pub fn is_chat(&self) -> bool {
        self.kind == MessageKind::Chat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn alice() -> Identity {
        Identity::new(
            UserId::new("alice".to_string()).unwrap(),
            DisplayName::new("Alice".to_string()).unwrap(),
            Role::Member,
        )
    }

    fn room() -> RoomId {
        RoomId::new("r1".to_string()).unwrap()
    }

    #[test]
    fn test_joined_message_is_chat_with_display_name() {
        // テスト項目: 入室通知はチャット種別で表示名を含む
        // given (前提条件):
        let identity = alice();
        let now = Utc::now();

        // when (操作):
        let message = Message::joined(&identity, room(), now);

        // then (期待する結果):
        assert_eq!(message.kind, MessageKind::Chat);
        assert_eq!(message.content, "Alice joined the room");
        assert_eq!(message.sender_id.as_str(), "alice");
        assert_eq!(message.timestamp, now);
        assert!(message.is_chat());
    }

    #[test]
    fn test_room_closed_message_is_sent_by_system() {
        // テスト項目: 退室指示メッセージの送信者名は System になる
        // given (前提条件):
        let admin = UserId::new("admin".to_string()).unwrap();

        // when (操作):
        let message = Message::room_closed(&admin, room(), Utc::now());

        // then (期待する結果):
        assert_eq!(message.kind, MessageKind::RoomClosed);
        assert_eq!(message.sender_id, admin);
        assert_eq!(message.sender_name.as_str(), "System");
        assert_eq!(message.content, ROOM_CLOSED_NOTICE);
        assert!(!message.is_chat());
    }

    #[test]
    fn test_message_kind_wire_names() {
        // テスト項目: MessageKind は snake_case の名前でシリアライズされる
        // given (前提条件):
        let kinds = [MessageKind::Edit, MessageKind::Chat, MessageKind::RoomClosed];

        // when (操作):
        let names: Vec<String> = kinds
            .iter()
            .map(|kind| serde_json::to_string(kind).unwrap())
            .collect();

        // then (期待する結果):
        assert_eq!(names, vec!["\"edit\"", "\"chat\"", "\"room_closed\""]);
        assert_eq!(MessageKind::RoomClosed.to_string(), "room_closed");
    }
}
