//! UseCase error types.

use thiserror::Error;

use crate::{
    domain::{AuthError, MessageKind, ValueObjectError},
    infrastructure::hub::HubError,
};

/// Reasons a connection is not admitted. Each one is raised before any
/// connection state exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("invalid room id: {0}")]
    InvalidRoomId(ValueObjectError),

    #[error(transparent)]
    HubUnavailable(#[from] HubError),
}

/// Relay failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Kind that only the server may originate
    #[error("clients may not send '{0}' messages")]
    ReservedKind(MessageKind),

    #[error(transparent)]
    HubUnavailable(#[from] HubError),
}

/// Room closure failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloseRoomError {
    #[error("only administrators can close rooms")]
    Forbidden,

    #[error("invalid room id: {0}")]
    InvalidRoomId(ValueObjectError),

    #[error(transparent)]
    HubUnavailable(#[from] HubError),
}
