//! In-memory repositories.

mod chat_log;

pub use chat_log::{DEFAULT_MAX_ENTRIES_PER_ROOM, InMemoryChatLogRepository};
