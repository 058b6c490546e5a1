//! HS256 JWT implementation of [`IdentityVerifier`].

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, DisplayName, Identity, IdentityVerifier, Role, UserId};

/// Claims carried by identity tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Expiry as a Unix timestamp (seconds)
    pub exp: i64,
}

impl Claims {
    /// Convert verified claims into a typed identity.
    ///
    /// A missing or blank username falls back to the user id.
    pub fn into_identity(self) -> Result<Identity, AuthError> {
        let user_id = UserId::new(self.user_id)
            .map_err(|e| AuthError::InvalidClaims(e.to_string()))?;
        let display_name = self
            .username
            .and_then(|name| DisplayName::new(name).ok())
            .unwrap_or_else(|| {
                DisplayName::new(user_id.as_str().to_string())
                    .unwrap_or_else(|_| DisplayName::system())
            });
        let role = match self.role.as_deref() {
            Some(role) if role.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Member,
        };

        Ok(Identity::new(user_id, display_name, role))
    }
}

/// Verifies (and issues) HS256 tokens signed with a shared secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for `identity` that expires after `ttl`.
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String, AuthError> {
        let claims = Claims {
            user_id: identity.user_id.as_str().to_string(),
            username: Some(identity.display_name.as_str().to_string()),
            role: match identity.role {
                Role::Admin => Some("admin".to_string()),
                Role::Member => None,
            },
            exp: (Utc::now() + ttl).timestamp(),
        };
        self.issue_claims(&claims)
    }

    /// Sign arbitrary claims.
    pub fn issue_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::warn!("JWT validation failed: {:?}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })?;

        token_data.claims.into_identity()
    }
}
