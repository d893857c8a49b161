//! Password hashing and verification using Argon2.
//!
//! Hashes are PHC strings carrying their own salt and parameters, so a hash
//! produced under an older work factor still verifies after the configuration
//! changes.
//!
//! # Examples
//!
//! ```rust
//! use adventure_auth::auth::CredentialVerifier;
//!
//! let verifier = CredentialVerifier::default();
//! let hash = verifier.hash("user_password_123").unwrap();
//!
//! assert!(verifier.verify("user_password_123", &hash));
//! assert!(!verifier.verify("wrong_password", &hash));
//! ```

use argon2::{
    Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version,
    password_hash::{PasswordHash, SaltString},
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Salted one-way hashing of user passwords.
#[derive(Clone)]
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
}

impl CredentialVerifier {
    /// Creates a verifier hashing with the given work factor.
    pub fn new(config: PasswordHashConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes `plaintext` with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)?
            .to_string())
    }

    /// Checks `plaintext` against a stored hash.
    ///
    /// A stored hash that cannot be parsed never matches.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let hash = match PasswordHash::new(stored_hash) {
            Ok(hash) => hash,
            Err(err) => {
                log::warn!("Stored password hash could not be parsed: {err}");
                return false;
            }
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &hash)
            .is_ok()
    }
}

impl Default for CredentialVerifier {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}
