//! Domain layer: value objects, messages, identities and the repository
//! interfaces the hub depends on.

pub mod auth;
pub mod error;
pub mod identity;
pub mod message;
pub mod repository;
pub mod value_object;

pub use auth::IdentityVerifier;
pub use error::{AuthError, RepositoryError, ValueObjectError};
pub use identity::{Identity, Role};
pub use message::{Message, MessageKind};
pub use repository::{ChatLogEntry, ChatLogRepository};
pub use value_object::{ConnectionId, DisplayName, RoomId, UserId};

#[cfg(test)]
pub use repository::MockChatLogRepository;
