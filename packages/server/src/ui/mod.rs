//! UI layer: axum router, HTTP/WebSocket handlers and the per-connection pumps.

mod auth;
pub mod connection;
mod error;
mod handler;
mod server;
mod signal;
pub mod state;

pub use auth::{CurrentIdentity, MaybeIdentity};
pub use error::ErrorResponse;
pub use server::{Server, ServerError, build_router};
pub use state::AppState;
