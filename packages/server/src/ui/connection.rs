//! Connection wrapper: one WebSocket split into an inbound and an outbound pump.
//!
//! The read pump parses frames, stamps them through the relay use case and
//! feeds the hub. The write pump drains the connection's private outbound
//! queue onto the socket and sends periodic pings. Closing the outbound queue
//! (the hub does so on unregister or eviction) is what stops the writer.

use std::{fmt::Display, sync::Arc};

use axum::{
    body::Bytes,
    extract::ws::{Message as WsMessage, WebSocket},
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior, interval_at, timeout, timeout_at},
};

use crate::{
    config::ConnectionConfig,
    domain::{Identity, Message},
    infrastructure::{
        dto::websocket::{InboundMessage, OutboundMessage},
        hub::WeakHub,
    },
    usecase::{Participant, RelayError, RelayMessageUseCase},
};

/// Why a read pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEnd {
    /// Peer sent a close frame or the stream ended
    PeerClosed,
    /// No ping/pong within the pong wait
    DeadlineExceeded,
    FrameTooLarge(usize),
    Malformed(String),
    Transport(String),
    /// The room's hub is no longer running
    HubGone,
}

/// Why a write pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEnd {
    /// The hub closed the outbound queue
    QueueClosed,
    Timeout,
    Failed(String),
    Encode(String),
}

/// An admitted participant bound to its socket.
pub struct Connection {
    participant: Participant,
    relay: Arc<RelayMessageUseCase>,
    config: ConnectionConfig,
}

impl Connection {
    pub fn new(
        participant: Participant,
        relay: Arc<RelayMessageUseCase>,
        config: ConnectionConfig,
    ) -> Self {
        Self {
            participant,
            relay,
            config,
        }
    }

    pub async fn run(self, socket: WebSocket) {
        let (sink, stream) = socket.split();
        self.serve(sink, stream).await;
    }

    /// Run both pumps until the connection is finished.
    ///
    /// The writer runs as its own task; the reader runs here. Whichever ends
    /// first, the connection is unregistered (closing the outbound queue), and
    /// this returns only after the writer has exited too.
    pub async fn serve<Si, St, E>(self, sink: Si, stream: St)
    where
        Si: Sink<WsMessage> + Unpin + Send + 'static,
        Si::Error: Display + Send,
        St: Stream<Item = Result<WsMessage, E>> + Unpin,
        E: Display,
    {
        let Participant {
            connection_id,
            identity,
            room_id,
            hub,
            outbound,
        } = self.participant;

        let mut writer = tokio::spawn(write_pump(sink, outbound, self.config.clone()));
        let mut writer_result = None;

        tokio::select! {
            end = read_pump(stream, &hub, &identity, &self.relay, &self.config) => {
                tracing::info!(
                    "Read pump of connection {} in room '{}' stopped: {:?}",
                    connection_id,
                    room_id,
                    end
                );
            }
            result = &mut writer => {
                writer_result = Some(result);
            }
        }

        if let Some(hub) = hub.upgrade() {
            if let Err(e) = hub.unregister(connection_id).await {
                tracing::warn!("Failed to unregister connection {}: {}", connection_id, e);
            }
        }

        let writer_result = match writer_result {
            Some(result) => result,
            None => writer.await,
        };
        match writer_result {
            Ok(end) => tracing::info!(
                "Write pump of connection {} in room '{}' stopped: {:?}",
                connection_id,
                room_id,
                end
            ),
            Err(e) => tracing::error!("Write pump of connection {} panicked: {}", connection_id, e),
        }
    }
}

/// Inbound pump: frames → stamped messages → hub.
///
/// Only ping and pong frames extend the read deadline.
pub async fn read_pump<St, E>(
    mut stream: St,
    hub: &WeakHub,
    sender: &Identity,
    relay: &RelayMessageUseCase,
    config: &ConnectionConfig,
) -> ReadEnd
where
    St: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: Display,
{
    let mut deadline = Instant::now() + config.pong_wait;

    loop {
        let frame = match timeout_at(deadline, stream.next()).await {
            Err(_) => return ReadEnd::DeadlineExceeded,
            Ok(None) => return ReadEnd::PeerClosed,
            Ok(Some(Err(e))) => return ReadEnd::Transport(e.to_string()),
            Ok(Some(Ok(frame))) => frame,
        };

        let decoded = match frame {
            WsMessage::Text(text) => decode_frame(text.as_str().as_bytes(), config),
            WsMessage::Binary(bytes) => decode_frame(&bytes, config),
            WsMessage::Close(_) => return ReadEnd::PeerClosed,
            _ => {
                deadline = Instant::now() + config.pong_wait;
                continue;
            }
        };
        let inbound = match decoded {
            Ok(inbound) => inbound,
            Err(end) => return end,
        };

        let Some(hub) = hub.upgrade() else {
            return ReadEnd::HubGone;
        };
        match relay
            .execute(&hub, sender, inbound.r#type, inbound.content)
            .await
        {
            Ok(_) => {}
            Err(RelayError::ReservedKind(kind)) => {
                tracing::warn!("Dropping '{}' frame from '{}'", kind, sender.user_id);
            }
            Err(RelayError::HubUnavailable(_)) => return ReadEnd::HubGone,
        }
    }
}

fn decode_frame(payload: &[u8], config: &ConnectionConfig) -> Result<InboundMessage, ReadEnd> {
    if payload.len() > config.max_message_size {
        return Err(ReadEnd::FrameTooLarge(payload.len()));
    }
    serde_json::from_slice(payload).map_err(|e| ReadEnd::Malformed(e.to_string()))
}

/// Outbound pump: private queue → socket, plus a ping every `ping_period`.
///
/// Neither branch is preferred, so a steady stream of messages cannot starve
/// the pings whose pongs keep the read deadline alive.
pub async fn write_pump<Si>(
    mut sink: Si,
    mut outbound: mpsc::Receiver<Message>,
    config: ConnectionConfig,
) -> WriteEnd
where
    Si: Sink<WsMessage> + Unpin,
    Si::Error: Display,
{
    let mut ticker = interval_at(Instant::now() + config.ping_period, config.ping_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            next = outbound.recv() => {
                let Some(message) = next else {
                    let _ = send_frame(&mut sink, WsMessage::Close(None), &config).await;
                    return WriteEnd::QueueClosed;
                };
                let json = match serde_json::to_string(&OutboundMessage::from(&message)) {
                    Ok(json) => json,
                    Err(e) => return WriteEnd::Encode(e.to_string()),
                };
                let frame = WsMessage::Text(json.into());
                if let Err(end) = send_frame(&mut sink, frame, &config).await {
                    return end;
                }
            }
            _ = ticker.tick() => {
                let frame = WsMessage::Ping(Bytes::new());
                if let Err(end) = send_frame(&mut sink, frame, &config).await {
                    return end;
                }
            }
        }
    }
}

async fn send_frame<Si>(
    sink: &mut Si,
    frame: WsMessage,
    config: &ConnectionConfig,
) -> Result<(), WriteEnd>
where
    Si: Sink<WsMessage> + Unpin,
    Si::Error: Display,
{
    match timeout(config.write_wait, sink.send(frame)).await {
        Err(_) => Err(WriteEnd::Timeout),
        Ok(Err(e)) => Err(WriteEnd::Failed(e.to_string())),
        Ok(Ok(())) => Ok(()),
    }
}
