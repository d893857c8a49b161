//! HTTP routes of the service.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use super::ctx::IdentityContext;
use super::mw_auth::{AuthState, mw_ctx_resolver, mw_require_auth};
use crate::account::AccountService;
use crate::account::api::{
    AuthResponse, LoginRequest, RegisterRequest, UserData, VerifyEmailQuery,
};
use crate::auth::{CredentialVerifier, TokenCodec};
use crate::config::AppConfig;
use crate::identity::{IdentityStore, InMemoryIdentityStore};
use crate::prelude::*;

#[derive(Clone)]
pub struct ApiState {
    pub auth: AuthState,
    pub accounts: Arc<AccountService>,
}

impl ApiState {
    pub fn new(auth: AuthState, accounts: Arc<AccountService>) -> Self {
        Self { auth, accounts }
    }

    /// Wires the service together from its configuration, backed by the given store.
    pub fn with_store(config: &AppConfig, store: Arc<dyn IdentityStore>) -> Result<Self> {
        let codec = Arc::new(TokenCodec::new(
            &config.signing_key()?,
            config.auth.default_ttl_seconds,
        ));
        let policy = Arc::new(config.policy_gate()?);
        let verifier = CredentialVerifier::new(config.password)?;

        Ok(Self::new(
            AuthState::new(codec.clone(), policy),
            Arc::new(AccountService::new(store, verifier, codec)),
        ))
    }

    /// Same as [`ApiState::with_store`] with an in-memory store.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(InMemoryIdentityStore::new()))
    }
}

/// The application router with authentication, tracing and CORS layers.
pub fn app(state: ApiState) -> Router {
    let auth = state.auth.clone();

    Router::new()
        .route("/", get(liveness))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify-email", get(verify_email))
        .route("/api/me", get(me))
        .layer(middleware::from_fn_with_state(auth.clone(), mw_require_auth))
        .layer(middleware::from_fn_with_state(auth, mw_ctx_resolver))
        // Headers stay out of the span, they carry bearer tokens.
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn liveness() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[axum::debug_handler]
async fn register(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = payload?;
    let accounts = state.accounts.clone();
    // Argon2 blocks, keep it off the async workers.
    let response = tokio::task::spawn_blocking(move || accounts.register(request)).await??;
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
async fn login(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(request) = payload?;
    let accounts = state.accounts.clone();
    let response = tokio::task::spawn_blocking(move || accounts.login(request)).await??;
    Ok(Json(response))
}

#[axum::debug_handler]
async fn verify_email(
    State(state): State<ApiState>,
    query: std::result::Result<Query<VerifyEmailQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(query) = query?;
    state.accounts.verify_email(&query.token)?;
    Ok(Json(json!({ "verified": true })))
}

#[axum::debug_handler]
async fn me(State(state): State<ApiState>, ctx: IdentityContext) -> Result<Json<UserData>> {
    Ok(Json(state.accounts.profile(&ctx)?))
}
