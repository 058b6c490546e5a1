//! HTTP and WebSocket request handlers.

mod http;
mod websocket;

pub use http::{close_room, get_chat_log, health_check, list_rooms};
pub use websocket::websocket_handler;
