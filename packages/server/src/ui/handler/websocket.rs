//! WebSocket upgrade handler for `/collaboration/{room_id}`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, ws::WebSocketUpgrade},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    ui::{auth::MaybeIdentity, connection::Connection, state::AppState},
    usecase::{AdmissionError, AdmitParticipantUseCase},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// Authenticate, validate the room id and upgrade.
///
/// Every rejection happens before the upgrade, so a refused client never
/// gets a hub membership.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<ConnectQuery>,
    MaybeIdentity(context_identity): MaybeIdentity,
) -> Result<Response, AdmissionError> {
    let identity = state
        .admit_participant_usecase
        .authenticate(context_identity, query.token.as_deref())
        .inspect_err(|e| tracing::warn!("Rejected connection to room '{}': {}", room_id, e))?;
    let room_id = AdmitParticipantUseCase::parse_room_id(room_id)?;

    let max_message_size = state.connection_config.max_message_size;
    let response = ws
        .max_message_size(max_message_size)
        .max_frame_size(max_message_size)
        .on_failed_upgrade(|e| tracing::warn!("WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| async move {
            let participant = match state
                .admit_participant_usecase
                .execute(identity, room_id)
                .await
            {
                Ok(participant) => participant,
                Err(e) => {
                    tracing::error!("Failed to admit upgraded connection: {}", e);
                    return;
                }
            };

            Connection::new(
                participant,
                state.relay_message_usecase.clone(),
                state.connection_config.clone(),
            )
            .run(socket)
            .await;
        });

    Ok(response.into_response())
}
