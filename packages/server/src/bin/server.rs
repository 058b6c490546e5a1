//! Kyodo collaboration hub server.
//!
//! Run with:
//! ```not_rust
//! JWT_SECRET=change-me cargo run --bin kyodo-server
//! cargo run --bin kyodo-server -- --host 0.0.0.0 --port 8080 --jwt-secret change-me
//! ```

use std::sync::Arc;

use clap::Parser;
use kyodo_server::{
    config::{ConnectionConfig, DEFAULT_HUB_INTAKE_CAPACITY, DEFAULT_QUEUE_CAPACITY},
    infrastructure::{
        auth::JwtVerifier, hub::HubRegistry, repository::InMemoryChatLogRepository,
    },
    ui::{AppState, Server},
};
use kyodo_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "kyodo-server")]
#[command(about = "Per-room broadcast hub for collaborative editing", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// HMAC secret used to verify HS256 access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Origin allowed by CORS (repeatable)
    #[arg(long = "allowed-origin", default_value = "http://localhost:3000")]
    allowed_origins: Vec<String>,

    /// Capacity of each connection's outbound queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Verifier / Repository / Registry
    // 2. AppState (UseCases)
    // 3. Server

    // 1.
    let verifier = Arc::new(JwtVerifier::new(&args.jwt_secret));
    let chat_log = Arc::new(InMemoryChatLogRepository::new());
    let registry = Arc::new(HubRegistry::new(DEFAULT_HUB_INTAKE_CAPACITY));

    // 2.
    let connection_config = ConnectionConfig::default().with_queue_capacity(args.queue_capacity);
    let state = AppState::new(
        registry,
        verifier,
        chat_log,
        Arc::new(SystemClock),
        connection_config,
    );

    // 3.
    let server = Server::new(state, args.allowed_origins);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
