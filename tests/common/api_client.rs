use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

/// Drives the router in-process, one request at a time.
pub struct ApiClient {
    pub router: Router,
}

impl ApiClient {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send http request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to get response body")
            .to_bytes();
        if bytes.is_empty() {
            return (status, Value::Null);
        }
        (
            status,
            serde_json::from_slice(&bytes).expect("Couldn't Parse Value"),
        )
    }

    pub async fn get(&self, endpoint: &str) -> (StatusCode, Value) {
        let request = Request::get(endpoint)
            .body(Body::empty())
            .expect("Couldn't create get request");
        self.send(request).await
    }

    /// GET with a raw `Authorization` header value.
    pub async fn get_with_auth(&self, endpoint: &str, authorization: &str) -> (StatusCode, Value) {
        let request = Request::get(endpoint)
            .header(header::AUTHORIZATION, authorization)
            .body(Body::empty())
            .expect("Couldn't create get request");
        self.send(request).await
    }

    pub async fn get_with_token(&self, endpoint: &str, token: &str) -> (StatusCode, Value) {
        self.get_with_auth(endpoint, &format!("Bearer {token}")).await
    }

    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> (StatusCode, Value) {
        let payload = serde_json::to_string(body).expect("Couldn't serialize body");
        self.post_raw(endpoint, payload).await
    }

    pub async fn post_raw(&self, endpoint: &str, payload: String) -> (StatusCode, Value) {
        let request = Request::post(endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .expect("Couldn't create post request");
        self.send(request).await
    }
}
