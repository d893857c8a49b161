use std::borrow::Cow;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::{debug, error};

use crate::prelude::*;

impl Error {
    /// Status and client facing message. Internal details are never included.
    fn status_and_message(&self) -> (StatusCode, Cow<'static, str>) {
        match self {
            Error::Auth(err) if err.is_rejection() => {
                (StatusCode::UNAUTHORIZED, Cow::Borrowed(err.reason()))
            }
            Error::CtxMissing => (
                StatusCode::UNAUTHORIZED,
                Cow::Borrowed("Authentication required"),
            ),
            Error::WrongCredentials => (
                StatusCode::UNAUTHORIZED,
                Cow::Borrowed("Invalid email or password"),
            ),
            Error::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, Cow::Borrowed("Missing credentials"))
            }

            Error::PasswordMismatch => (
                StatusCode::BAD_REQUEST,
                Cow::Borrowed("Password doesn't match. Try again."),
            ),
            Error::Validation(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|field| field.to_string())
                    .collect();
                fields.sort();
                (
                    StatusCode::BAD_REQUEST,
                    Cow::Owned(format!("Invalid fields: {}", fields.join(", "))),
                )
            }
            Error::JsonRejection(rejection) => {
                (rejection.status(), Cow::Owned(rejection.body_text()))
            }
            Error::QueryRejection(rejection) => {
                (rejection.status(), Cow::Owned(rejection.body_text()))
            }
            Error::VerificationTokenInvalid => (
                StatusCode::BAD_REQUEST,
                Cow::Borrowed("Invalid verification token"),
            ),
            Error::VerificationTokenExpired => (
                StatusCode::BAD_REQUEST,
                Cow::Borrowed("Verification token expired"),
            ),

            Error::EmailTaken => (
                StatusCode::CONFLICT,
                Cow::Borrowed("An account has already been made with this email."),
            ),
            Error::UsernameTaken => (
                StatusCode::CONFLICT,
                Cow::Borrowed("This username is already taken."),
            ),
            Error::IdentityNotFound => (StatusCode::NOT_FOUND, Cow::Borrowed("User not found")),

            Error::Auth(_)
            | Error::IO(_)
            | Error::Json(_)
            | Error::TomlDeserialization(_)
            | Error::MissingEnvVar(_)
            | Error::InvalidConfig(_)
            | Error::StorePoisoned
            | Error::Join(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Cow::Borrowed("Internal server error"),
            ),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Creating API error response for error: {:?}", self);
        } else {
            debug!("Creating API error response for error: {}", self);
        }

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod test {
    use http_body_util::BodyExt;
    use serde_json::Value;

    use super::*;
    use crate::auth::AuthError;

    async fn render(err: Error) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn token_rejections_are_401() {
        for err in [
            AuthError::Malformed,
            AuthError::InvalidSignature,
            AuthError::Expired,
            AuthError::MissingOrMalformedHeader,
            AuthError::SubjectMismatch,
            AuthError::Internal,
        ] {
            let reason = err.reason();
            let (status, body) = render(Error::Auth(err)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, json!({ "error": reason }));
        }
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = render(Error::InvalidConfig(String::from("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, _) = render(Error::Auth(AuthError::EmptySubject)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn account_errors() {
        assert_eq!(render(Error::EmailTaken).await.0, StatusCode::CONFLICT);
        assert_eq!(render(Error::PasswordMismatch).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(render(Error::WrongCredentials).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(render(Error::IdentityNotFound).await.0, StatusCode::NOT_FOUND);
    }
}
