//! Authentication error types.

/// Errors raised while minting, verifying or checking credentials.
///
/// The first group classifies why a presented token was refused. Every one of
/// them ends the request with a 401, never a 500.
#[derive(Debug, thiserror::Error, Clone)]
pub enum AuthError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Token expired")]
    Expired,
    #[error("Missing or malformed Authorization header")]
    MissingOrMalformedHeader,
    #[error("Token subject mismatch")]
    SubjectMismatch,
    #[error("Token verification failed")]
    Internal,

    /* Minting and setup */
    #[error("Token subject must not be empty")]
    EmptySubject,
    #[error("Token TTL must be a positive number of seconds, got {0}")]
    InvalidTtl(i64),
    #[error("Claim '{0}' is reserved")]
    ReservedClaim(String),
    #[error("Signing key must be at least {min} bytes, got {len}")]
    WeakSigningKey { len: usize, min: usize },
    #[error("Signing key is not valid base64")]
    InvalidSigningKey,
    #[error(transparent)]
    TokenCreation(#[from] jsonwebtoken::errors::Error),

    #[error("Error hashing password {0}")]
    PasswordHash(argon2::password_hash::Error),
    #[error("Invalid password hashing parameters {0}")]
    HashParams(argon2::Error),
}

impl AuthError {
    /// Whether this error describes a refused token or header, as opposed to a
    /// failure on our side while minting or hashing.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Malformed
                | Self::InvalidSignature
                | Self::Expired
                | Self::MissingOrMalformedHeader
                | Self::SubjectMismatch
                | Self::Internal
        )
    }

    /// Human readable reason sent back in a 401 body.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed => "Invalid authentication token",
            Self::InvalidSignature => "Invalid authentication token",
            Self::Expired => "Authentication token expired",
            Self::MissingOrMalformedHeader => "Authentication required",
            Self::SubjectMismatch => "Token does not belong to this user",
            Self::Internal => "Authentication failed",
            _ => "Internal server error",
        }
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(value)
    }
}

impl From<argon2::Error> for AuthError {
    fn from(value: argon2::Error) -> Self {
        Self::HashParams(value)
    }
}
