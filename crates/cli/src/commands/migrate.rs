//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ob-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/admin/migrations/` and are embedded at build
//! time:
//! ```text
//! migrations/
//! └── 20260301000001_create_stores.sql
//! ```

use thiserror::Error;
use tracing::info;

use onboarding_admin::config::{ConfigError, get_database_url};
use onboarding_admin::db;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the onboarding database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("ADMIN_DATABASE_URL")?;

    info!("Connecting to onboarding database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running onboarding migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    info!("Onboarding migrations complete!");
    Ok(())
}
