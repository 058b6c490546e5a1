//! Request authentication: an optional bearer-token middleware plus the
//! extractors handlers use to read the identity it establishes.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::domain::{AuthError, Identity};

use super::state::AppState;

/// Verify `Authorization: Bearer <token>` when present.
///
/// A request without the header passes through unauthenticated; the
/// WebSocket route then falls back to its `token` query parameter. A header
/// that is present but invalid is rejected here.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if let Some(header) = req.headers().get(AUTHORIZATION) {
        let header = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
        let token = bearer_token(header)?;
        let identity = state.verifier.verify(token)?;
        tracing::debug!("Authenticated '{}' from bearer token", identity.user_id);
        req.extensions_mut().insert(identity);
    }

    Ok(next.run(req).await)
}

fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// The authenticated caller. Rejects with 401 when the request carried no
/// bearer token.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or(AuthError::MissingToken)
    }
}

/// The caller's identity if the middleware established one.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(parts.extensions.get::<Identity>().cloned()))
    }
}
