//! Shared helpers for the in-process integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use chrono::Utc;
use futures_util::StreamExt;
use kyodo_server::{
    config::{ConnectionConfig, DEFAULT_HUB_INTAKE_CAPACITY},
    domain::{DisplayName, Identity, Role, RoomId, UserId},
    infrastructure::{
        auth::{Claims, JwtVerifier},
        dto::websocket::OutboundMessage,
        hub::HubRegistry,
        repository::InMemoryChatLogRepository,
    },
    ui::{AppState, Server},
};
use kyodo_shared::time::SystemClock;
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message as WsMessage,
};

pub const SECRET: &str = "integration-test-secret";

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A server bound to an ephemeral port, running inside the test's runtime.
pub struct TestServer {
    pub addr: SocketAddr,
    pub verifier: JwtVerifier,
    pub registry: Arc<HubRegistry>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ConnectionConfig::default()).await
    }

    pub async fn start_with(config: ConnectionConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let registry = Arc::new(HubRegistry::new(DEFAULT_HUB_INTAKE_CAPACITY));
        let state = AppState::new(
            registry.clone(),
            Arc::new(JwtVerifier::new(SECRET)),
            Arc::new(InMemoryChatLogRepository::new()),
            Arc::new(SystemClock),
            config,
        );
        let server = Server::new(state, vec!["http://localhost:3000".to_string()]);
        tokio::spawn(async move {
            if let Err(e) = server.serve(listener).await {
                panic!("Test server failed: {e}");
            }
        });

        Self {
            addr,
            verifier: JwtVerifier::new(SECRET),
            registry,
        }
    }

    pub fn token(&self, user: &str, role: Role) -> String {
        let identity = Identity::new(
            UserId::new(user.to_string()).unwrap(),
            DisplayName::new(user.to_string()).unwrap(),
            role,
        );
        self.verifier
            .issue(&identity, chrono::Duration::minutes(5))
            .unwrap()
    }

    pub fn expired_token(&self, user: &str) -> String {
        self.verifier
            .issue_claims(&Claims {
                user_id: user.to_string(),
                username: None,
                role: None,
                exp: (Utc::now() - chrono::Duration::minutes(5)).timestamp(),
            })
            .unwrap()
    }

    pub fn ws_url(&self, room: &str) -> String {
        format!("ws://{}/collaboration/{}", self.addr, room)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect as `user` and wait until the hub has registered the connection.
    pub async fn join(&self, room: &str, user: &str) -> WsClient {
        let before = self.member_count(room).await;
        let url = format!("{}?token={}", self.ws_url(room), self.token(user, Role::Member));
        let (ws, _) = connect_async(url).await.expect("Failed to connect");
        self.wait_for_members(room, before + 1).await;
        ws
    }

    pub async fn member_count(&self, room: &str) -> usize {
        let room_id = RoomId::new(room.to_string()).unwrap();
        match self.registry.get(&room_id).await {
            Some(hub) => hub.members().await.map(|m| m.len()).unwrap_or(0),
            None => 0,
        }
    }

    pub async fn wait_for_members(&self, room: &str, expected: usize) {
        for _ in 0..100 {
            if self.member_count(room).await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "room '{room}' never reached {expected} members (has {})",
            self.member_count(room).await
        );
    }
}

/// Next application message, skipping control frames.
pub async fn recv_message(ws: &mut WsClient) -> OutboundMessage {
    loop {
        let frame = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("Timed out waiting for a message")
            .expect("Connection ended")
            .expect("WebSocket error");
        match frame {
            WsMessage::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Invalid outbound JSON");
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
            other => panic!("Unexpected frame: {other:?}"),
        }
    }
}

/// Assert that no application message arrives within `wait`.
pub async fn assert_silent(ws: &mut WsClient, wait: Duration) {
    if let Ok(frame) = timeout(wait, ws.next()).await {
        panic!("Expected silence, got {frame:?}");
    }
}
