//! Store lifecycle service.
//!
//! Validates input, gates saves on the duplicate check, and enforces stage
//! transitions before handing records to a [`StoreRecords`] backend.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use onboarding_core::timestamp::parse_flexible;
use onboarding_core::{
    CanonicalTimestamp, Email, Region, StageError, StoreId, StoreStage, TemporalValue,
};

use super::duplicates::{DEFAULT_DUPLICATE_THRESHOLD, DuplicateDetector};
use crate::db::{RepositoryError, StoreRecords, StoreRepository};
use crate::models::{NewStore, Store, StoreCandidate, StoreChanges, StoreFilter};

/// Longest accepted store name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("store {0} not found")]
    NotFound(StoreId),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result of a save that may be held back by likely duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome<T> {
    /// The record was written.
    Saved(T),
    /// Similar stores exist; resubmit with confirmation to save anyway.
    NeedsConfirmation(Vec<StoreCandidate>),
}

/// Raw input for creating a store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateStoreInput {
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub stage: Option<StoreStage>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub launch_at: TemporalValue,
    /// Save even when similar stores exist.
    #[serde(default)]
    pub confirm_duplicates: bool,
}

impl CreateStoreInput {
    /// Validate into an insertable record.
    ///
    /// # Errors
    ///
    /// Returns `StoreServiceError::Validation` for a blank or overlong name,
    /// an unknown region, a malformed email, or an unparseable launch date.
    pub fn validate(&self) -> Result<NewStore, StoreServiceError> {
        Ok(NewStore {
            name: validate_name(&self.name)?,
            region: parse_region(&self.region)?,
            stage: self.stage.unwrap_or_default(),
            contact_name: normalize_optional(self.contact_name.as_deref()),
            contact_email: validate_email(self.contact_email.as_deref())?,
            notes: normalize_optional(self.notes.as_deref()),
            launch_at: parse_launch(&self.launch_at)?,
        })
    }
}

// =============================================================================
// Validation Helpers
// =============================================================================

fn validate_name(name: &str) -> Result<String, StoreServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreServiceError::Validation(
            "Store name is required".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(StoreServiceError::Validation(format!(
            "Store name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

fn parse_region(region: &str) -> Result<Region, StoreServiceError> {
    region.parse().map_err(|_| {
        let known: Vec<&str> = Region::ALL.iter().map(Region::as_str).collect();
        StoreServiceError::Validation(format!(
            "Unknown region '{region}'. Expected one of: {}",
            known.join(", ")
        ))
    })
}

/// Trim, treating blank as absent.
fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Blank clears the email; anything else must be a valid address.
fn validate_email(email: Option<&str>) -> Result<Option<Email>, StoreServiceError> {
    normalize_optional(email)
        .map(|email| {
            Email::parse(&email).map_err(|e| {
                StoreServiceError::Validation(format!("Invalid contact email '{email}': {e}"))
            })
        })
        .transpose()
}

/// A missing or blank value clears the launch date; anything else must parse.
fn parse_launch(value: &TemporalValue) -> Result<Option<CanonicalTimestamp>, StoreServiceError> {
    if value.is_missing() {
        return Ok(None);
    }
    parse_flexible(value).map(Some).ok_or_else(|| {
        StoreServiceError::Validation("Launch date is not a recognised date".to_string())
    })
}

/// Apply `changes` to `store`, returning whether name or region changed.
fn apply_changes(store: &mut Store, changes: &StoreChanges) -> Result<bool, StoreServiceError> {
    let mut identity_changed = false;

    if let Some(name) = &changes.name {
        let name = validate_name(name)?;
        identity_changed |= name != store.name;
        store.name = name;
    }
    if let Some(region) = &changes.region {
        let region = parse_region(region)?;
        identity_changed |= region != store.region;
        store.region = region;
    }
    if let Some(stage) = changes.stage {
        store.stage = store.stage.transition_to(stage)?;
    }
    if let Some(contact_name) = &changes.contact_name {
        store.contact_name = normalize_optional(Some(contact_name));
    }
    if let Some(contact_email) = &changes.contact_email {
        store.contact_email = validate_email(Some(contact_email))?;
    }
    if let Some(notes) = &changes.notes {
        store.notes = normalize_optional(Some(notes));
    }
    if let Some(launch_at) = &changes.launch_at {
        store.launch_at = parse_launch(launch_at)?;
    }

    Ok(identity_changed)
}

// =============================================================================
// Service
// =============================================================================

/// Store operations over a [`StoreRecords`] backend.
#[derive(Debug, Clone, Copy)]
pub struct StoreService<R> {
    repo: R,
    threshold: u8,
}

impl<'a> StoreService<StoreRepository<'a>> {
    /// Create a store service over the onboarding database.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self::with_records(StoreRepository::new(pool))
    }
}

impl<R: StoreRecords> StoreService<R> {
    /// Create a store service over any record backend, with the default
    /// duplicate threshold.
    #[must_use]
    pub const fn with_records(repo: R) -> Self {
        Self {
            repo,
            threshold: DEFAULT_DUPLICATE_THRESHOLD,
        }
    }

    /// Use a custom duplicate threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold.min(100);
        self
    }

    fn detector(&self) -> DuplicateDetector<&R> {
        DuplicateDetector::new(&self.repo).with_threshold(self.threshold)
    }

    /// Create a store.
    ///
    /// Returns `NeedsConfirmation` when similar stores exist in the region
    /// and `input.confirm_duplicates` is false.
    ///
    /// # Errors
    ///
    /// Returns `StoreServiceError::Validation` for invalid input, or
    /// `StoreServiceError::Repository` if the insert fails.
    #[instrument(skip(self, input), fields(name = %input.name, region = %input.region))]
    pub async fn create(
        &self,
        input: &CreateStoreInput,
    ) -> Result<SaveOutcome<Store>, StoreServiceError> {
        let new_store = input.validate()?;

        if !input.confirm_duplicates {
            let matches = self
                .detector()
                .check_duplicates(&new_store.name, new_store.region.as_str(), None)
                .await;
            if !matches.is_empty() {
                info!(matches = matches.len(), "Create held for duplicate confirmation");
                return Ok(SaveOutcome::NeedsConfirmation(matches));
            }
        }

        let store = self.repo.insert(&new_store).await?;
        info!(store_id = %store.id, "Store created");
        Ok(SaveOutcome::Saved(store))
    }

    /// Apply a partial update.
    ///
    /// A rename or region change re-runs the duplicate check, excluding the
    /// store itself.
    ///
    /// # Errors
    ///
    /// Returns `StoreServiceError::NotFound` for an unknown ID,
    /// `StoreServiceError::Stage` for a disallowed stage transition, and
    /// `StoreServiceError::Validation` for invalid fields.
    #[instrument(skip(self, changes), fields(store_id = %id))]
    pub async fn update(
        &self,
        id: &StoreId,
        changes: &StoreChanges,
        confirm_duplicates: bool,
    ) -> Result<SaveOutcome<Store>, StoreServiceError> {
        let mut store = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| StoreServiceError::NotFound(id.clone()))?;

        let identity_changed = apply_changes(&mut store, changes)?;

        if identity_changed && !confirm_duplicates {
            let matches = self
                .detector()
                .check_duplicates(&store.name, store.region.as_str(), Some(id))
                .await;
            if !matches.is_empty() {
                info!(matches = matches.len(), "Update held for duplicate confirmation");
                return Ok(SaveOutcome::NeedsConfirmation(matches));
            }
        }

        store.updated_at = CanonicalTimestamp::now();
        let store = self.repo.save(&store).await.map_err(|e| match e {
            RepositoryError::NotFound => StoreServiceError::NotFound(id.clone()),
            other => other.into(),
        })?;
        info!(stage = %store.stage, "Store updated");
        Ok(SaveOutcome::Saved(store))
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreServiceError::NotFound` if no store has this ID.
    pub async fn get(&self, id: &StoreId) -> Result<Store, StoreServiceError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| StoreServiceError::NotFound(id.clone()))
    }

    /// List stores matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `StoreServiceError::Repository` if the query fails.
    pub async fn list(&self, filter: &StoreFilter) -> Result<Vec<Store>, StoreServiceError> {
        Ok(self.repo.list(filter).await?)
    }
}
