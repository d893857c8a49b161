//! Stateless authentication: signed tokens, signing keys and password hashes.

pub mod claims;
pub mod email_verification;
pub mod error;
pub mod jwt;
pub mod secret_hash;
pub mod signing_key;

pub use claims::Claims;
pub use error::AuthError;
pub use jwt::TokenCodec;
pub use secret_hash::CredentialVerifier;
pub use signing_key::SigningKey;

pub const AUTH_HEADER: &str = "Authorization";
pub const AUTH_HEADER_PREFIX: &str = "Bearer ";
