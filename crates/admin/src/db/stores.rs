//! Store repository for database operations.
//!
//! Timestamps are persisted in canonical `(seconds, nanos)` column pairs and
//! converted back through [`CanonicalTimestamp::new`], so a row that violates
//! the canonical invariants surfaces as [`RepositoryError::DataCorruption`].

use sqlx::PgPool;

use onboarding_core::{CanonicalTimestamp, Email, Region, StoreId, StoreStage};

use super::{RepositoryError, StoreRecords};
use crate::models::{NewStore, Store, StoreCandidate, StoreFilter};
use crate::services::duplicates::StoreDirectory;

/// Default page size for store listings.
const DEFAULT_LIMIT: i64 = 50;

/// Upper bound for a single listing page.
const MAX_LIMIT: i64 = 500;

/// Columns selected for a full store row.
const STORE_COLUMNS: &str = r"
    id, name, region, stage, contact_name, contact_email, notes,
    launch_seconds, launch_nanos,
    created_seconds, created_nanos,
    updated_seconds, updated_nanos
";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for store queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: String,
    name: String,
    region: String,
    stage: String,
    contact_name: Option<String>,
    contact_email: Option<String>,
    notes: Option<String>,
    launch_seconds: Option<i64>,
    launch_nanos: Option<i32>,
    created_seconds: i64,
    created_nanos: i32,
    updated_seconds: i64,
    updated_nanos: i32,
}

fn timestamp_column(
    column: &str,
    seconds: i64,
    nanos: i32,
) -> Result<CanonicalTimestamp, RepositoryError> {
    CanonicalTimestamp::new(seconds, nanos)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column}: {e}")))
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let region = row.region.parse::<Region>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid region in database: {e}"))
        })?;
        let stage = row.stage.parse::<StoreStage>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stage in database: {e}"))
        })?;
        let contact_email = row
            .contact_email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid contact_email: {e}")))?;
        let launch_at = match (row.launch_seconds, row.launch_nanos) {
            (Some(seconds), Some(nanos)) => Some(timestamp_column("launch_at", seconds, nanos)?),
            (None, None) => None,
            _ => {
                return Err(RepositoryError::DataCorruption(
                    "launch_at has only one of seconds/nanos".to_string(),
                ));
            }
        };

        Ok(Self {
            id: StoreId::new(row.id),
            name: row.name,
            region,
            stage,
            contact_name: row.contact_name,
            contact_email,
            notes: row.notes,
            launch_at,
            created_at: timestamp_column("created_at", row.created_seconds, row.created_nanos)?,
            updated_at: timestamp_column("updated_at", row.updated_seconds, row.updated_nanos)?,
        })
    }
}

/// Internal row type for duplicate-check candidates.
#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    id: String,
    name: String,
    region: String,
}

impl From<CandidateRow> for StoreCandidate {
    fn from(row: CandidateRow) -> Self {
        Self {
            id: Some(StoreId::new(row.id)),
            name: row.name,
            region: row.region,
        }
    }
}

fn split(ts: Option<CanonicalTimestamp>) -> (Option<i64>, Option<i32>) {
    ts.map_or((None, None), |ts| {
        (Some(ts.seconds()), Some(ts.nanoseconds()))
    })
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for store database operations.
#[derive(Debug, Clone, Copy)]
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new store with a generated ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a primary key collision.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &NewStore) -> Result<Store, RepositoryError> {
        let id = StoreId::generate();
        let now = CanonicalTimestamp::now();
        let (launch_seconds, launch_nanos) = split(input.launch_at);

        let query = format!(
            r"
            INSERT INTO onboarding.store (
                id, name, region, stage, contact_name, contact_email, notes,
                launch_seconds, launch_nanos,
                created_seconds, created_nanos, updated_seconds, updated_nanos
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $10, $11)
            RETURNING {STORE_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, StoreRow>(&query)
            .bind(&id)
            .bind(&input.name)
            .bind(input.region.as_str())
            .bind(input.stage.as_str())
            .bind(&input.contact_name)
            .bind(&input.contact_email)
            .bind(&input.notes)
            .bind(launch_seconds)
            .bind(launch_nanos)
            .bind(now.seconds())
            .bind(now.nanoseconds())
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("store_pkey")
                {
                    return RepositoryError::Conflict(format!("store {id} already exists"));
                }
                RepositoryError::Database(e)
            })?;

        row.try_into()
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &StoreId) -> Result<Option<Store>, RepositoryError> {
        let query = format!("SELECT {STORE_COLUMNS} FROM onboarding.store WHERE id = $1");

        let row = sqlx::query_as::<_, StoreRow>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List stores, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &StoreFilter) -> Result<Vec<Store>, RepositoryError> {
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = filter.offset.unwrap_or(0).max(0);

        let query = format!(
            r"
            SELECT {STORE_COLUMNS}
            FROM onboarding.store
            WHERE ($1::text IS NULL OR region = $1)
              AND ($2::text IS NULL OR stage = $2)
            ORDER BY created_seconds DESC, created_nanos DESC
            LIMIT $3 OFFSET $4
            "
        );

        let rows = sqlx::query_as::<_, StoreRow>(&query)
            .bind(filter.region.map(|r| r.as_str()))
            .bind(filter.stage.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Persist every mutable field of an existing store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn save(&self, store: &Store) -> Result<Store, RepositoryError> {
        let (launch_seconds, launch_nanos) = split(store.launch_at);

        let query = format!(
            r"
            UPDATE onboarding.store SET
                name = $2, region = $3, stage = $4,
                contact_name = $5, contact_email = $6, notes = $7,
                launch_seconds = $8, launch_nanos = $9,
                updated_seconds = $10, updated_nanos = $11
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, StoreRow>(&query)
            .bind(&store.id)
            .bind(&store.name)
            .bind(store.region.as_str())
            .bind(store.stage.as_str())
            .bind(&store.contact_name)
            .bind(&store.contact_email)
            .bind(&store.notes)
            .bind(launch_seconds)
            .bind(launch_nanos)
            .bind(store.updated_at.seconds())
            .bind(store.updated_at.nanoseconds())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Fetch the duplicate-check view of every store in a region.
    ///
    /// The comparison is an exact, case-sensitive string match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn candidates_in_region(
        &self,
        region: &str,
    ) -> Result<Vec<StoreCandidate>, RepositoryError> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r"
            SELECT id, name, region
            FROM onboarding.store
            WHERE region = $1
            ORDER BY created_seconds, created_nanos
            ",
        )
        .bind(region)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl StoreDirectory for StoreRepository<'_> {
    async fn stores_in_region(&self, region: &str) -> Result<Vec<StoreCandidate>, RepositoryError> {
        self.candidates_in_region(region).await
    }
}

impl StoreRecords for StoreRepository<'_> {
    async fn insert(&self, input: &NewStore) -> Result<Store, RepositoryError> {
        self.create(input).await
    }

    async fn get(&self, id: &StoreId) -> Result<Option<Store>, RepositoryError> {
        StoreRepository::get(self, id).await
    }

    async fn list(&self, filter: &StoreFilter) -> Result<Vec<Store>, RepositoryError> {
        StoreRepository::list(self, filter).await
    }

    async fn save(&self, store: &Store) -> Result<Store, RepositoryError> {
        StoreRepository::save(self, store).await
    }
}
