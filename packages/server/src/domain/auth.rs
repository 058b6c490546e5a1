//! Identity verification interface.
//!
//! Token parsing lives in the infrastructure layer; the admission use case only
//! sees a verified [`Identity`].

use super::{AuthError, Identity};

/// Turns a bearer token into a verified identity.
pub trait IdentityVerifier: Send + Sync {
    /// Verify signature and expiry and return the typed identity.
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
