//! HTTP rendering of domain and use case errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::AuthError,
    usecase::{AdmissionError, CloseRoomError},
};

/// JSON error body shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
}

fn error_response(status: StatusCode, error_code: &str, error: String) -> Response {
    let body = Json(ErrorResponse {
        error,
        error_code: error_code.to_string(),
    });
    (status, body).into_response()
}

fn auth_status(error: &AuthError) -> (StatusCode, &'static str) {
    match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "missing_token"),
        AuthError::InvalidAuthHeader => (StatusCode::UNAUTHORIZED, "invalid_auth_header"),
        AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "invalid_token"),
        AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "token_expired"),
        AuthError::InvalidClaims(_) => (StatusCode::UNAUTHORIZED, "invalid_claims"),
        AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code) = auth_status(&self);
        error_response(status, error_code, self.to_string())
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            AdmissionError::Unauthorized(auth) => auth_status(auth),
            AdmissionError::InvalidRoomId(_) => (StatusCode::BAD_REQUEST, "invalid_room_id"),
            AdmissionError::HubUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "hub_unavailable")
            }
        };
        error_response(status, error_code, self.to_string())
    }
}

impl IntoResponse for CloseRoomError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            CloseRoomError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            CloseRoomError::InvalidRoomId(_) => (StatusCode::BAD_REQUEST, "invalid_room_id"),
            CloseRoomError::HubUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "hub_unavailable")
            }
        };
        error_response(status, error_code, self.to_string())
    }
}
