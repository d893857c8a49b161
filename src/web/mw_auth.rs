//! Authentication middleware.
//!
//! Two layers cooperate:
//! - [`mw_ctx_resolver`] reads the `Authorization` header, verifies the bearer
//!   token and stores an [`AuthOutcome`] in the request extensions. It never
//!   answers a request itself.
//! - [`mw_require_auth`] consults the [`PolicyGate`] and refuses protected
//!   requests whose outcome is not `Authenticated`.
//!
//! The resolver has to run first, so it is added last:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use axum::{Router, middleware, routing::get};
//! use adventure_auth::auth::{SigningKey, TokenCodec};
//! use adventure_auth::web::mw_auth::{AuthState, mw_ctx_resolver, mw_require_auth};
//! use adventure_auth::web::policy::PolicyGate;
//!
//! let key = SigningKey::from_secret(&"doc-example-key!".repeat(4)).unwrap();
//! let auth = AuthState::new(
//!     Arc::new(TokenCodec::new(&key, 3600)),
//!     Arc::new(PolicyGate::public_paths(["/"]).unwrap()),
//! );
//!
//! let app: Router<()> = Router::new()
//!     .route("/", get(|| async { "public" }))
//!     .route("/private", get(|| async { "protected" }))
//!     .layer(middleware::from_fn_with_state(auth.clone(), mw_require_auth))
//!     .layer(middleware::from_fn_with_state(auth, mw_ctx_resolver));
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};

use super::ctx::AuthOutcome;
use super::policy::{Access, PolicyGate};
use crate::auth::{AUTH_HEADER, AUTH_HEADER_PREFIX, AuthError, Claims, TokenCodec};
use crate::prelude::*;

/// Shared, read-only state of the authentication layers.
#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
    pub policy: Arc<PolicyGate>,
}

impl AuthState {
    pub fn new(codec: Arc<TokenCodec>, policy: Arc<PolicyGate>) -> Self {
        Self { codec, policy }
    }
}

/// Works out who is calling from the request headers.
///
/// # Arguments
///
/// * `headers` - Headers of the incoming request
/// * `codec` - Codec verifying the bearer token
///
/// # Returns
///
/// [`AuthOutcome::Anonymous`] without an `Authorization` header,
/// [`AuthOutcome::Authenticated`] for a verified token and
/// [`AuthOutcome::Rejected`] for anything else. Never panics.
pub fn resolve_outcome(headers: &HeaderMap, codec: &TokenCodec) -> AuthOutcome {
    resolve_with(headers, |token| codec.verify(token))
}

/// [`resolve_outcome`] with the token verification supplied by the caller.
pub(crate) fn resolve_with<F>(headers: &HeaderMap, verify: F) -> AuthOutcome
where
    F: FnOnce(&str) -> std::result::Result<Claims, AuthError>,
{
    let Some(value) = headers.get(AUTH_HEADER) else {
        return AuthOutcome::Anonymous;
    };
    let Some(token) = bearer_token(value) else {
        return AuthOutcome::Rejected(AuthError::Malformed);
    };

    let verified = catch_unwind(AssertUnwindSafe(|| verify(token))).unwrap_or_else(|_| {
        error!("Token verification panicked");
        Err(AuthError::Internal)
    });

    match verified {
        Ok(claims) => AuthOutcome::Authenticated(claims.into()),
        Err(err) => AuthOutcome::Rejected(err),
    }
}

/// The token of a `Bearer <token>` header value.
fn bearer_token(value: &HeaderValue) -> Option<&str> {
    value
        .to_str()
        .ok()?
        .strip_prefix(AUTH_HEADER_PREFIX)
        .filter(|token| !token.is_empty() && !token.contains(char::is_whitespace))
}

/// Attaches an [`AuthOutcome`] to every request.
pub async fn mw_ctx_resolver(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let outcome = resolve_outcome(req.headers(), &state.codec);
    if let AuthOutcome::Rejected(err) = &outcome {
        debug!(route = %req.uri().path(), reason = %err, "Bearer token rejected");
    }
    req.extensions_mut().insert(outcome);

    next.run(req).await
}

/// Lets public routes through and requires an authenticated caller elsewhere.
pub async fn mw_require_auth(
    State(state): State<AuthState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let path = req.uri().path();
    if state.policy.access_for(path) == Access::Public {
        return Ok(next.run(req).await);
    }

    let verdict = match req.extensions().get::<AuthOutcome>() {
        Some(outcome) => outcome.require().map(|_| ()).map_err(Error::from),
        None => {
            error!(route = %path, "Authentication context missing, is mw_ctx_resolver installed?");
            Err(Error::CtxMissing)
        }
    };
    if let Err(err) = verdict {
        warn!(route = %path, reason = %err, "Unauthenticated request refused");
        return Err(err);
    }

    Ok(next.run(req).await)
}
