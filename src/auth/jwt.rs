//! Signed token minting and verification.
//!
//! Tokens are compact JWTs signed with HMAC-SHA512:
//! `base64url(header).base64url(payload).base64url(signature)`.
//!
//! - [`TokenCodec::mint`]: sign a new token for a subject
//! - [`TokenCodec::verify`]: check structure, signature and expiry, return the claims
//! - [`TokenCodec::validate`]: `verify` plus a subject check, collapsed to a `bool`
//!
//! # Examples
//!
//! ```rust
//! use adventure_auth::auth::{SigningKey, TokenCodec};
//! use serde_json::Map;
//!
//! let key = SigningKey::from_secret(&"my-super-secret-".repeat(4)).unwrap();
//! let codec = TokenCodec::new(&key, 3600);
//!
//! let token = codec.mint("alice", Map::new(), 604800).unwrap();
//! assert!(codec.validate(&token, "alice"));
//! assert!(!codec.validate(&token, "bob"));
//! assert!(!codec.validate("not.a.jwt", "alice"));
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde_json::{Map, Value};

use super::claims::{Claims, RESERVED_CLAIMS};
use super::error::AuthError;
use super::signing_key::SigningKey;

/// Algorithm used for every token. Tokens announcing anything else are refused.
const ALGORITHM: Algorithm = Algorithm::HS512;

/// Key pair derived from the process signing key.
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Mints and verifies tokens with a single, immutable signing key.
///
/// Holds no mutable state, so one instance behind an `Arc` serves every
/// request concurrently.
pub struct TokenCodec {
    keys: Keys,
    validation: Validation,
    default_ttl: i64,
}

impl TokenCodec {
    /// Creates a codec signing with `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - The process signing key
    /// * `default_ttl` - Lifetime in seconds used by [`TokenCodec::mint_default`]
    pub fn new(key: &SigningKey, default_ttl: i64) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked by us so the boundary second counts as expired
        // and no leeway applies.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            keys: Keys::new(key.as_bytes()),
            validation,
            default_ttl,
        }
    }

    /// Lifetime in seconds of tokens minted with [`TokenCodec::mint_default`].
    pub fn default_ttl(&self) -> i64 {
        self.default_ttl
    }

    /// Signs a token for `subject` valid for `ttl` seconds from now.
    ///
    /// # Arguments
    ///
    /// * `subject` - Username the token is issued for, must not be empty
    /// * `claims` - Extra claims; `sub`, `iat` and `exp` are reserved
    /// * `ttl` - Lifetime in seconds, must be positive
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The compact token
    /// * `Err(AuthError)` - Invalid input or a signing failure
    ///
    /// # Example
    ///
    /// ```rust
    /// use adventure_auth::auth::{AuthError, SigningKey, TokenCodec};
    /// use serde_json::{Map, json};
    ///
    /// let codec = TokenCodec::new(&SigningKey::from_secret(&"k".repeat(64)).unwrap(), 60);
    ///
    /// let mut claims = Map::new();
    /// claims.insert("role".into(), json!("admin"));
    /// assert!(codec.mint("alice", claims, 3600).is_ok());
    /// assert!(matches!(codec.mint("alice", Map::new(), 0), Err(AuthError::InvalidTtl(0))));
    /// ```
    pub fn mint(
        &self,
        subject: &str,
        claims: Map<String, Value>,
        ttl: i64,
    ) -> Result<String, AuthError> {
        self.mint_at(subject, claims, ttl, Utc::now().timestamp())
    }

    /// [`TokenCodec::mint`] with the configured default lifetime.
    pub fn mint_default(
        &self,
        subject: &str,
        claims: Map<String, Value>,
    ) -> Result<String, AuthError> {
        self.mint(subject, claims, self.default_ttl)
    }

    /// Signs a token as if the current time were `now`.
    pub fn mint_at(
        &self,
        subject: &str,
        claims: Map<String, Value>,
        ttl: i64,
        now: i64,
    ) -> Result<String, AuthError> {
        if subject.is_empty() {
            return Err(AuthError::EmptySubject);
        }
        if ttl <= 0 {
            return Err(AuthError::InvalidTtl(ttl));
        }
        if let Some(name) = claims.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
            return Err(AuthError::ReservedClaim(name.clone()));
        }
        let exp = now.checked_add(ttl).ok_or(AuthError::InvalidTtl(ttl))?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp,
            custom: claims,
        };

        encode(&Header::new(ALGORITHM), &claims, &self.keys.encoding).map_err(|err| {
            log::error!("Failed to encode JWT {err}");
            AuthError::TokenCreation(err)
        })
    }

    /// Verifies `token` against the current time.
    ///
    /// See [`TokenCodec::verify_at`] for the checks applied.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies `token` as if the current time were `now`.
    ///
    /// Checks, in order:
    /// - three non-empty base64url segments, a JSON header and a payload with a
    ///   non-empty `sub`, integer `iat` and `exp`, and `exp > iat`, otherwise
    ///   [`AuthError::Malformed`]
    /// - HS512 signature under our key, otherwise [`AuthError::InvalidSignature`]
    /// - `now < exp`, otherwise [`AuthError::Expired`]
    ///
    /// # Arguments
    ///
    /// * `token` - The compact token, without the `Bearer ` prefix
    /// * `now` - Current time in seconds since the epoch
    ///
    /// # Returns
    ///
    /// The verified claims, or the reason the token was refused.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let claims = parse_unverified(token)?;

        decode::<Value>(token, &self.keys.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::InvalidSignature
                }
                _ => AuthError::Malformed,
            }
        })?;

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    /// `true` when `token` verifies and was issued to `expected_subject`.
    ///
    /// Never fails loudly: every problem is logged and reported as `false`.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        self.validate_at(token, expected_subject, Utc::now().timestamp())
    }

    /// [`TokenCodec::validate`] as if the current time were `now`.
    ///
    /// # Arguments
    ///
    /// * `token` - The compact token
    /// * `expected_subject` - Username the token must have been issued for
    /// * `now` - Current time in seconds since the epoch
    ///
    /// # Returns
    ///
    /// `true` only if the token verifies at `now` and its `sub` equals
    /// `expected_subject` exactly.
    ///
    /// # Example
    ///
    /// ```rust
    /// use adventure_auth::auth::{SigningKey, TokenCodec};
    /// use serde_json::Map;
    ///
    /// let codec = TokenCodec::new(&SigningKey::from_secret(&"k".repeat(64)).unwrap(), 60);
    /// let token = codec.mint_at("alice", Map::new(), 10, 1_000).unwrap();
    ///
    /// assert!(codec.validate_at(&token, "alice", 1_009));
    /// assert!(!codec.validate_at(&token, "alice", 1_010));
    /// assert!(!codec.validate_at(&token, "bob", 1_009));
    /// ```
    pub fn validate_at(&self, token: &str, expected_subject: &str, now: i64) -> bool {
        let result = self.verify_at(token, now).and_then(|claims| {
            if claims.sub == expected_subject {
                Ok(claims)
            } else {
                Err(AuthError::SubjectMismatch)
            }
        });

        match result {
            Ok(_) => true,
            Err(err) => {
                log::debug!("Token validation failed: {err}");
                false
            }
        }
    }
}

/// Decodes every segment and the payload without looking at the signature.
fn parse_unverified(token: &str) -> Result<Claims, AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = segments[..] else {
        return Err(AuthError::Malformed);
    };
    if [header, payload, signature].iter().any(|s| s.is_empty()) {
        return Err(AuthError::Malformed);
    }

    let header = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AuthError::Malformed)?;
    serde_json::from_slice::<Header>(&header).map_err(|_| AuthError::Malformed)?;
    URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AuthError::Malformed)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| AuthError::Malformed)?;
    if claims.sub.is_empty() || claims.exp <= claims.iat {
        return Err(AuthError::Malformed);
    }
    Ok(claims)
}
