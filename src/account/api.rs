//! Request and response bodies of the account endpoints.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::identity::Identity;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub confirm_password: String,
    #[validate(length(min = 3))]
    pub user_name: String,
}

impl RegisterRequest {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
            user_name: user_name.into(),
        }
    }

    pub fn is_password_matching(&self) -> bool {
        self.password == self.confirm_password
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

/// Public view of an identity. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: i64,
    pub email: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub email_verified: bool,
}

impl From<Identity> for UserData {
    fn from(value: Identity) -> Self {
        Self {
            user_id: value.user_id,
            email: value.email,
            user_name: value.username,
            created_at: value.created_at,
            email_verified: value.email_verified,
        }
    }
}

impl fmt::Display for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User '{}' (ID: {})", self.user_name, self.user_id)
    }
}

/// Body returned by login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: Option<String>,
    pub user_data: Option<UserData>,
    pub error: Option<String>,
}

impl AuthResponse {
    pub fn success(message: impl Into<String>, token: String, user_data: UserData) -> Self {
        Self {
            success: true,
            message: message.into(),
            token: Some(token),
            user_data: Some(user_data),
            error: None,
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn register_request_uses_camel_case() {
        let request: RegisterRequest = serde_json::from_value(json!({
            "email": "autotest1@example.com",
            "password": "pass1234",
            "confirmPassword": "pass1234",
            "userName": "AutoTest1"
        }))
        .unwrap();

        assert!(request.is_password_matching());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn register_request_validation() {
        let short_password = RegisterRequest::new("a@example.com", "12345", "12345", "alice");
        let short_name = RegisterRequest::new("a@example.com", "123456", "123456", "al");
        let bad_email = RegisterRequest::new("not-an-email", "123456", "123456", "alice");

        for request in [short_password, short_name, bad_email] {
            assert!(request.validate().is_err(), "{request:?}");
        }
    }

    #[test]
    fn user_data_hides_the_hash() {
        let identity = Identity {
            user_id: 1,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: Utc::now(),
            email_verified: false,
            verification_token: Some("t".into()),
            verification_expiry: None,
        };
        let value = serde_json::to_value(UserData::from(identity)).unwrap();

        assert_eq!(value["userName"], "alice");
        assert_eq!(value["userId"], 1);
        assert!(!value.to_string().contains("argon2"));
    }
}
