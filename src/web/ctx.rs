//! Request-scoped authentication context.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::{Map, Value};

use crate::auth::{AuthError, Claims};
use crate::prelude::*;

/// Identity of the caller, attached to a request once its token verified.
///
/// Handlers receive it as an extractor; extracting it on a request without a
/// verified token yields a 401.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityContext {
    /// Username the token was issued for.
    pub subject: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub claims: Map<String, Value>,
}

impl From<Claims> for IdentityContext {
    fn from(value: Claims) -> Self {
        Self {
            subject: value.sub,
            issued_at: value.iat,
            expires_at: value.exp,
            claims: value.custom,
        }
    }
}

/// Result of inspecting a request's `Authorization` header.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// No `Authorization` header at all.
    Anonymous,
    Authenticated(IdentityContext),
    Rejected(AuthError),
}

impl AuthOutcome {
    pub fn identity(&self) -> Option<&IdentityContext> {
        match self {
            Self::Authenticated(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// The identity, or the reason a protected route has to refuse the request.
    pub fn require(&self) -> std::result::Result<&IdentityContext, AuthError> {
        match self {
            Self::Authenticated(ctx) => Ok(ctx),
            Self::Rejected(err) => Err(err.clone()),
            Self::Anonymous => Err(AuthError::MissingOrMalformedHeader),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for IdentityContext {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        Ok(parts
            .extensions
            .get::<AuthOutcome>()
            .ok_or(Error::CtxMissing)?
            .require()?
            .clone())
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn ctx() -> IdentityContext {
        let mut claims = Map::new();
        claims.insert("uid".into(), json!(1));
        IdentityContext::from(Claims {
            sub: "alice".into(),
            iat: 1,
            exp: 2,
            custom: claims,
        })
    }

    #[test]
    fn claims_become_context() {
        let ctx = ctx();
        assert_eq!(ctx.subject, "alice");
        assert_eq!(ctx.expires_at, 2);
        assert_eq!(ctx.claims["uid"], 1);
    }

    #[test]
    fn require() {
        assert_eq!(
            AuthOutcome::Authenticated(ctx()).require().unwrap().subject,
            "alice"
        );
        assert!(matches!(
            AuthOutcome::Anonymous.require(),
            Err(AuthError::MissingOrMalformedHeader)
        ));
        assert!(matches!(
            AuthOutcome::Rejected(AuthError::Expired).require(),
            Err(AuthError::Expired)
        ));
        assert!(AuthOutcome::Anonymous.identity().is_none());
    }
}
