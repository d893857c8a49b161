//! Email verification tokens.
//!
//! These are plain random lookup keys with an expiry, checked against the
//! identity store. They are not signed and carry no claims.

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

/// How long a freshly issued verification token stays usable.
pub const VERIFICATION_TOKEN_LIFETIME: TimeDelta = TimeDelta::hours(24);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailVerificationToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl EmailVerificationToken {
    pub fn generate(now: DateTime<Utc>) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            expires_at: now + VERIFICATION_TOKEN_LIFETIME,
        }
    }
}

/// A verification token is still usable at its expiry instant.
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > expires_at
}
