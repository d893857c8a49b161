//! Token payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim names filled in by the codec itself.
pub const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Claims carried in the payload of every token we issue.
///
/// Anything beyond `sub`, `iat` and `exp` lands in [`Claims::custom`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued for.
    pub sub: String,
    /// Issued at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch. Always greater than `iat`.
    pub exp: i64,
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.custom.get(name)
    }

    /// `true` once `now` reached `exp`. A token is never valid at `exp` itself.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn custom_claims_are_flattened() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "alice",
            "iat": 10,
            "exp": 20,
            "uid": 7,
            "email": "alice@example.com"
        }))
        .unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.get("uid"), Some(&json!(7)));
        assert_eq!(claims.custom.len(), 2);

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["email"], "alice@example.com");
        assert_eq!(value["exp"], 20);
    }

    #[test]
    fn missing_required_claim_fails() {
        let result = serde_json::from_value::<Claims>(json!({"sub": "alice", "exp": 20}));
        assert!(result.is_err());
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let claims = Claims {
            sub: "alice".into(),
            iat: 10,
            exp: 20,
            custom: Map::new(),
        };
        assert!(!claims.is_expired_at(19));
        assert!(claims.is_expired_at(20));
        assert!(claims.is_expired_at(21));
    }
}
