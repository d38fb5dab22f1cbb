//! Application state

use std::sync::Arc;

use crate::auth::JwtService;
use crate::catalog::CatalogService;
use crate::config::Config;
use crate::db::{BoxError, MemoryStore, PgStore, Store};
use crate::orders::OrderService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Order workflow engine
    pub orders: OrderService,
    pub catalog: CatalogService,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    /// Connect to PostgreSQL when configured, otherwise fall back to the
    /// in-memory store
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => Arc::new(PgStore::connect(url, config.database_max_connections).await?),
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store (data is not persisted)");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(store, JwtService::with_config(config.jwt.clone())))
    }

    pub fn with_store(store: Arc<dyn Store>, jwt: JwtService) -> Self {
        Self {
            orders: OrderService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            store,
            jwt: Arc::new(jwt),
        }
    }
}
