//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{ChatLogEntryDto, CloseRoomResponseDto, MemberDto, RoomSummaryDto},
    ui::{auth::CurrentIdentity, state::AppState},
    usecase::CloseRoomError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Rooms with a live hub, and who is in them
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.list_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    let summaries = rooms
        .into_iter()
        .map(|room| RoomSummaryDto {
            id: room.room_id.into_string(),
            member_count: room.members.len(),
            members: room.members.into_iter().map(MemberDto::from).collect(),
        })
        .collect();

    Json(summaries)
}

/// Persisted chat messages of a room, oldest first
pub async fn get_chat_log(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ChatLogEntryDto>>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    let entries = state
        .get_chat_log_usecase
        .execute(&room_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read chat log of room '{}': {}", room_id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    tracing::debug!(
        "User '{}' read {} chat log entries of room '{}'",
        identity.user_id,
        entries.len(),
        room_id
    );

    Ok(Json(entries.into_iter().map(ChatLogEntryDto::from).collect()))
}

/// Notify every member that the room is closed (admin only)
pub async fn close_room(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(room_id): Path<String>,
) -> Result<Json<CloseRoomResponseDto>, CloseRoomError> {
    let room_id = RoomId::new(room_id).map_err(CloseRoomError::InvalidRoomId)?;

    let notified = state.close_room_usecase.execute(&identity, room_id).await?;

    Ok(Json(CloseRoomResponseDto {
        message: "Room Closed".to_string(),
        notified,
    }))
}
