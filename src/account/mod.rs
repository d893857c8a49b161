//! Account registration, login and email verification.
//!
//! This is where passwords are checked and tokens are minted. The request
//! pipeline never comes here to authenticate; it only verifies tokens.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::email_verification::{self, EmailVerificationToken};
use crate::auth::{CredentialVerifier, TokenCodec};
use crate::identity::{Identity, IdentityStore, NewIdentity, normalize_email};
use crate::prelude::*;
use crate::web::ctx::IdentityContext;

pub mod api;

use api::{AuthResponse, LoginRequest, RegisterRequest, UserData};

/// Account operations on top of an [`IdentityStore`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use adventure_auth::account::{AccountService, api::{LoginRequest, RegisterRequest}};
/// use adventure_auth::auth::{CredentialVerifier, SigningKey, TokenCodec};
/// use adventure_auth::identity::InMemoryIdentityStore;
///
/// let codec = Arc::new(TokenCodec::new(&SigningKey::from_secret(&"k".repeat(64)).unwrap(), 3600));
/// let accounts = AccountService::new(
///     Arc::new(InMemoryIdentityStore::new()),
///     CredentialVerifier::default(),
///     codec.clone(),
/// );
///
/// accounts
///     .register(RegisterRequest::new("alice@example.com", "pass1234", "pass1234", "alice"))
///     .unwrap();
/// let login = accounts
///     .login(LoginRequest::new("alice@example.com", "pass1234"))
///     .unwrap();
/// assert!(codec.validate(&login.token.unwrap(), "alice"));
/// ```
pub struct AccountService {
    store: Arc<dyn IdentityStore>,
    verifier: CredentialVerifier,
    codec: Arc<TokenCodec>,
}

impl AccountService {
    /// Creates the service.
    ///
    /// # Arguments
    ///
    /// * `store` - Where identities are kept
    /// * `verifier` - Hashes and checks passwords
    /// * `codec` - Mints the tokens handed out on registration and login
    pub fn new(
        store: Arc<dyn IdentityStore>,
        verifier: CredentialVerifier,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            store,
            verifier,
            codec,
        }
    }

    /// Creates an account and logs it in.
    ///
    /// # Returns
    ///
    /// * `Ok(AuthResponse)` - The new account and its token
    /// * `Err(Error::Validation)` / `Err(Error::PasswordMismatch)` - Bad request
    /// * `Err(Error::EmailTaken)` / `Err(Error::UsernameTaken)` - Conflict
    pub fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        request.validate()?;
        if !request.is_password_matching() {
            return Err(Error::PasswordMismatch);
        }
        if self.store.find_by_email(&request.email)?.is_some() {
            return Err(Error::EmailTaken);
        }

        let now = Utc::now();
        let verification = EmailVerificationToken::generate(now);
        let identity = self.store.insert(NewIdentity {
            username: request.user_name,
            email: normalize_email(&request.email),
            password_hash: self.verifier.hash(&request.password)?,
            created_at: now,
            verification_token: Some(verification.token),
            verification_expiry: Some(verification.expires_at),
        })?;
        info!("Registered user {}", identity.user_id);

        let token = self.issue_token(&identity)?;
        Ok(AuthResponse::success(
            "Registration successful!",
            token,
            identity.into(),
        ))
    }

    /// Checks credentials and mints a token for the account.
    ///
    /// An unknown email and a wrong password are indistinguishable to the caller.
    pub fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        if request.password.is_empty() {
            return Err(Error::MissingCredentials);
        }
        request.validate()?;

        let identity = self
            .store
            .find_by_email(&request.email)?
            .filter(|identity| {
                self.verifier
                    .verify(&request.password, &identity.password_hash)
            });
        let Some(identity) = identity else {
            warn!("Failed login attempt");
            return Err(Error::WrongCredentials);
        };

        let token = self.issue_token(&identity)?;
        Ok(AuthResponse::success(
            "Login successful",
            token,
            identity.into(),
        ))
    }

    /// Consumes an email verification token.
    pub fn verify_email(&self, token: &str) -> Result<UserData> {
        let identity = self
            .store
            .find_by_verification_token(token)?
            .ok_or(Error::VerificationTokenInvalid)?;

        let expired = identity
            .verification_expiry
            .is_none_or(|expiry| email_verification::is_expired(expiry, Utc::now()));
        if expired {
            return Err(Error::VerificationTokenExpired);
        }

        let identity = self.store.mark_email_verified(identity.user_id)?;
        info!("Verified email of user {}", identity.user_id);
        Ok(identity.into())
    }

    /// Account of the authenticated caller.
    pub fn profile(&self, ctx: &IdentityContext) -> Result<UserData> {
        self.store
            .find_by_username(&ctx.subject)?
            .map(UserData::from)
            .ok_or(Error::IdentityNotFound)
    }

    fn issue_token(&self, identity: &Identity) -> Result<String> {
        let mut claims = Map::new();
        claims.insert(String::from("uid"), json!(identity.user_id));
        claims.insert(String::from("email"), Value::String(identity.email.clone()));
        Ok(self.codec.mint_default(&identity.username, claims)?)
    }
}
