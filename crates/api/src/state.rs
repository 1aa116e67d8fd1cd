//! Shared context injected into every resolver.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::ApiConfig;

/// Shared resources for the API.
///
/// Cheaply cloneable via `Arc`; constructed once at startup and stored in
/// the GraphQL schema's data, so every component receives an explicit
/// handle instead of reaching for ambient globals.
#[derive(Clone)]
pub struct ApiContext {
    inner: Arc<ApiContextInner>,
}

struct ApiContextInner {
    config: ApiConfig,
    pool: PgPool,
    tokens: TokenService,
}

impl ApiContext {
    /// Create the shared context from configuration and a connection pool.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let tokens = TokenService::new(&config.auth_secret);
        Self {
            inner: Arc::new(ApiContextInner {
                config,
                pool,
                tokens,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
