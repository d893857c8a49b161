use std::sync::Arc;

use adventure_auth::{
    auth::TokenCodec,
    config::AppConfig,
    identity::InMemoryIdentityStore,
    web::routes::{ApiState, app},
};

use super::api_client::ApiClient;

pub struct TestContext {
    pub api: ApiClient,
    pub codec: Arc<TokenCodec>,
    pub store: Arc<InMemoryIdentityStore>,
}

impl TestContext {
    /// A fresh service with an empty store and cheap password hashing.
    pub fn new() -> Self {
        let config = AppConfig::from_toml(&format!(
            r#"
            [auth]
            signing_secret = "{}"
            default_ttl_seconds = 3600

            [password]
            memory_kib = 1024
            iterations = 1
            parallelism = 1
            "#,
            "integration-test-key".repeat(4)
        ))
        .expect("Failed to parse test configuration");

        let store = Arc::new(InMemoryIdentityStore::new());
        let state =
            ApiState::with_store(&config, store.clone()).expect("Failed to build the service");
        let codec = state.auth.codec.clone();

        Self {
            api: ApiClient {
                router: app(state),
            },
            codec,
            store,
        }
    }
}
