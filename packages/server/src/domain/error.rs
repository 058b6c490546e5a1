//! Domain error types.

use thiserror::Error;

/// Errors raised while constructing value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Room id was empty or whitespace only
    #[error("room id must not be empty")]
    EmptyRoomId,

    /// Room id exceeds the maximum length
    #[error("room id is too long ({0} > {max} chars)", max = super::value_object::MAX_ROOM_ID_LEN)]
    RoomIdTooLong(usize),

    /// User id was empty or whitespace only
    #[error("user id must not be empty")]
    EmptyUserId,

    /// Display name was empty or whitespace only
    #[error("display name must not be empty")]
    EmptyDisplayName,
}

/// Errors raised by repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Only chat messages are written to the chat log
    #[error("message kind '{0}' is not stored in the chat log")]
    UnsupportedKind(String),

    /// Backend storage failure
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Errors raised while verifying an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token in the request context, header or query
    #[error("missing token")]
    MissingToken,

    /// Authorization header is not `Bearer <token>`
    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    /// Signature, algorithm or structure check failed
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token `exp` is in the past
    #[error("token expired")]
    TokenExpired,

    /// Token verified but its claims do not describe a usable identity
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    /// Token could not be issued
    #[error("internal auth error: {0}")]
    Internal(String),
}
