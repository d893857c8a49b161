//! HMAC signing key material.

use std::fmt::{Debug, Display};

use base64::{Engine, engine::general_purpose::STANDARD};

use super::error::AuthError;

/// Smallest accepted key, 512 bits to match HS512.
pub const MIN_SIGNING_KEY_LEN: usize = 64;

/// Prefix marking a configured secret as base64 encoded bytes.
const BASE64_PREFIX: &str = "base64:";

/// Secret used to sign and verify every token of the process.
///
/// Built once from configuration and then only read. Neither `Debug` nor
/// `Display` reveal the bytes.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Builds a key from the configured secret string.
    ///
    /// A secret starting with `base64:` is decoded, any other secret is used
    /// as its UTF-8 bytes. The result must be at least
    /// [`MIN_SIGNING_KEY_LEN`] bytes long.
    ///
    /// ```rust
    /// use adventure_auth::auth::SigningKey;
    ///
    /// assert!(SigningKey::from_secret("too short").is_err());
    /// assert!(SigningKey::from_secret(&"k".repeat(64)).is_ok());
    /// ```
    pub fn from_secret(secret: &str) -> Result<Self, AuthError> {
        let bytes = match secret.strip_prefix(BASE64_PREFIX) {
            Some(encoded) => STANDARD
                .decode(encoded.trim())
                .map_err(|_| AuthError::InvalidSigningKey)?,
            None => secret.as_bytes().to_vec(),
        };
        Self::from_bytes(bytes)
    }

    /// Builds a key from raw bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Key material, at least [`MIN_SIGNING_KEY_LEN`] bytes
    ///
    /// # Returns
    ///
    /// * `Ok(SigningKey)` - The key
    /// * `Err(AuthError::WeakSigningKey)` - Fewer bytes than required
    ///
    /// # Example
    ///
    /// ```rust
    /// use adventure_auth::auth::{AuthError, SigningKey};
    ///
    /// assert!(SigningKey::from_bytes([7u8; 64]).is_ok());
    /// assert!(matches!(
    ///     SigningKey::from_bytes([7u8; 32]),
    ///     Err(AuthError::WeakSigningKey { len: 32, min: 64 })
    /// ));
    /// ```
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, AuthError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SIGNING_KEY_LEN {
            return Err(AuthError::WeakSigningKey {
                len: bytes.len(),
                min: MIN_SIGNING_KEY_LEN,
            });
        }
        Ok(Self(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(REDACTED)")
    }
}

impl Display for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "REDACTED")
    }
}
