//! User identities and their storage.

use chrono::{DateTime, Utc};

use crate::prelude::*;

pub mod memory;

pub use memory::InMemoryIdentityStore;

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    /// Always lowercase.
    pub email: String,
    /// Argon2 PHC string, never the plaintext.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub email_verified: bool,
    pub verification_token: Option<String>,
    pub verification_expiry: Option<DateTime<Utc>>,
}

/// Everything needed to store a new identity; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub verification_token: Option<String>,
    pub verification_expiry: Option<DateTime<Utc>>,
}

/// Lowercases and trims an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Persistence of identities.
///
/// Implementations enforce uniqueness of both `email` and `username`,
/// reporting [`Error::EmailTaken`] or [`Error::UsernameTaken`].
pub trait IdentityStore: Send + Sync {
    fn insert(&self, identity: NewIdentity) -> Result<Identity>;

    fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;

    fn find_by_username(&self, username: &str) -> Result<Option<Identity>>;

    fn find_by_verification_token(&self, token: &str) -> Result<Option<Identity>>;

    /// Marks the email verified and forgets the verification token.
    fn mark_email_verified(&self, user_id: i64) -> Result<Identity>;
}
