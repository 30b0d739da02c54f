//! Bearer token verification against a JWKS document.

pub mod jwks;

pub use jwks::{AuthConfig, Claims, JwksVerifier, VerifyError};
