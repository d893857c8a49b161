//! Authentication service.
//!
//! Serves registration, login and email verification, and guards every other
//! route with bearer token authentication.
//!
//! ```bash
//! export JWT_SECRET=base64:$(head -c 64 /dev/urandom | base64 -w0)
//! export SERVER_ADDR=127.0.0.1:3000
//! server
//! ```
//!
//! Set `CONFIG_PATH` to read a TOML configuration file instead.

use adventure_auth::{
    config::AppConfig,
    web::routes::{ApiState, app},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adventure_auth::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,adventure_auth=debug,tower_http=debug", env!("CARGO_CRATE_NAME"))
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    tracing::debug!("Loaded configuration {:?}", config);
    let state = ApiState::from_config(&config)?;
    tracing::info!("Tokens last {} seconds", state.auth.codec.default_ttl());
    for rule in state.auth.policy.rules() {
        tracing::debug!("Route policy {} is {:?}", rule.pattern.as_str(), rule.access);
    }

    let listener = tokio::net::TcpListener::bind(&config.server.address).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for the shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
