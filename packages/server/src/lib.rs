//! Kyodo collaboration hub.
//!
//! Accepts authenticated WebSocket connections per editing room and fans every
//! edit or chat message out to all members of that room through a single
//! per-room hub.

pub mod config;

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
