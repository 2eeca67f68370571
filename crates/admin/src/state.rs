//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::StoreRepository;
use crate::services::{DuplicateDetector, StoreService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Duplicate detector over the store table, using the configured threshold.
    #[must_use]
    pub fn detector(&self) -> DuplicateDetector<StoreRepository<'_>> {
        DuplicateDetector::new(StoreRepository::new(self.pool()))
            .with_threshold(self.config().duplicate_threshold)
    }

    /// Store service using the configured threshold.
    #[must_use]
    pub fn stores(&self) -> StoreService<StoreRepository<'_>> {
        StoreService::new(self.pool()).with_threshold(self.config().duplicate_threshold)
    }
}
