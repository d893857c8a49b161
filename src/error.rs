//! Main Crate Error

use crate::auth::AuthError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDeserialization(#[from] toml::de::Error),

    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    JsonRejection(#[from] axum::extract::rejection::JsonRejection),

    #[error(transparent)]
    QueryRejection(#[from] axum::extract::rejection::QueryRejection),

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    /* Config Errors */
    #[error("Env Variable '{0}' missing")]
    MissingEnvVar(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /* Account Errors */
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Wrong Credentials")]
    WrongCredentials,
    #[error("Missing Credentials")]
    MissingCredentials,
    #[error("Identity not found")]
    IdentityNotFound,
    #[error("Invalid verification token")]
    VerificationTokenInvalid,
    #[error("Verification token expired")]
    VerificationTokenExpired,

    #[error("Identity store lock poisoned")]
    StorePoisoned,

    #[error("Context Missing")]
    CtxMissing,
}
