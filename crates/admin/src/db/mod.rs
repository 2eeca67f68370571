//! Database operations for the onboarding `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `onboarding.store` - Stores moving through the onboarding pipeline
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p onboarding-cli -- migrate
//! ```

pub mod stores;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use onboarding_core::StoreId;

pub use stores::StoreRepository;

use crate::models::{NewStore, Store, StoreFilter};
use crate::services::duplicates::StoreDirectory;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate primary key).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence for store records.
///
/// Anything that stores records can also answer duplicate-check queries.
pub trait StoreRecords: StoreDirectory + Sync {
    /// Insert a new store, assigning its ID and timestamps.
    fn insert(
        &self,
        input: &NewStore,
    ) -> impl Future<Output = Result<Store, RepositoryError>> + Send;

    /// Get a store by ID.
    fn get(
        &self,
        id: &StoreId,
    ) -> impl Future<Output = Result<Option<Store>, RepositoryError>> + Send;

    /// List stores matching `filter`, newest first.
    fn list(
        &self,
        filter: &StoreFilter,
    ) -> impl Future<Output = Result<Vec<Store>, RepositoryError>> + Send;

    /// Overwrite an existing store. `RepositoryError::NotFound` if it is gone.
    fn save(&self, store: &Store) -> impl Future<Output = Result<Store, RepositoryError>> + Send;
}

impl<T: StoreRecords> StoreRecords for &T {
    fn insert(
        &self,
        input: &NewStore,
    ) -> impl Future<Output = Result<Store, RepositoryError>> + Send {
        (**self).insert(input)
    }

    fn get(
        &self,
        id: &StoreId,
    ) -> impl Future<Output = Result<Option<Store>, RepositoryError>> + Send {
        (**self).get(id)
    }

    fn list(
        &self,
        filter: &StoreFilter,
    ) -> impl Future<Output = Result<Vec<Store>, RepositoryError>> + Send {
        (**self).list(filter)
    }

    fn save(&self, store: &Store) -> impl Future<Output = Result<Store, RepositoryError>> + Send {
        (**self).save(store)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
