//! Data Transfer Objects for the wire and HTTP surfaces.

pub mod conversion;
pub mod http;
pub mod websocket;
