//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::{
    auth::optional_auth,
    handler::{close_room, get_chat_log, health_check, list_rooms, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

pub type ServerError = Box<dyn std::error::Error + Send + Sync>;

/// Collaboration hub server
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(registry, verifier, chat_log, clock, ConnectionConfig::default());
/// let server = Server::new(state, vec!["http://localhost:3000".to_string()]);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// Origins allowed by CORS
    allowed_origins: Vec<String>,
}

impl Server {
    pub fn new(state: AppState, allowed_origins: Vec<String>) -> Self {
        Self {
            state: Arc::new(state),
            allowed_origins,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.allowed_origins)
    }

    /// Bind to `host:port` and serve until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), ServerError> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let app = self.router();
        let local_addr = listener.local_addr()?;

        tracing::info!("Collaboration hub listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}/collaboration/{{room_id}}", local_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        // WebSocket エンドポイント
        .route("/collaboration/{room_id}", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(list_rooms))
        .route("/api/rooms/{room_id}/messages", get(get_chat_log))
        .route("/api/rooms/{room_id}/close", post(close_room))
        .layer(middleware::from_fn_with_state(state.clone(), optional_auth))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
