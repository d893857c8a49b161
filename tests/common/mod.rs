#![allow(dead_code)]

use adventure_auth::account::api::{AuthResponse, RegisterRequest};
use axum::http::StatusCode;

pub mod api_client;
pub mod test_context;

use api_client::ApiClient;

pub const PASSWORD: &str = "pass1234";

pub fn register_request(user_name: &str) -> RegisterRequest {
    RegisterRequest::new(
        format!("{user_name}@example.com"),
        PASSWORD,
        PASSWORD,
        user_name,
    )
}

/// Registers `user_name` and returns the token it was issued.
pub async fn register(api: &ApiClient, user_name: &str) -> String {
    let (status, body) = api
        .post("/api/auth/register", &register_request(user_name))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let response: AuthResponse = serde_json::from_value(body).expect("Couldn't Parse Value");
    response.token.expect("Registration returned no token")
}
