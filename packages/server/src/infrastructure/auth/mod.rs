//! Identity token verification.

pub mod jwt;

pub use jwt::{Claims, JwtVerifier};
