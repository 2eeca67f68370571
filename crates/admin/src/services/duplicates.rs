//! Duplicate store detection.
//!
//! Before a store is created or renamed, its name is compared against every
//! store already recorded in the same region. The check is advisory: a
//! failing store directory never blocks the caller, it only means no
//! duplicates can be reported.
//!
//! ```text
//! Idle -> Checking -> Found | NotFound -> Idle
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, instrument, warn};

use onboarding_core::StoreId;

use super::similarity::token_set_ratio;
use crate::db::RepositoryError;
use crate::models::StoreCandidate;

/// Names scoring strictly above this are duplicates.
pub const DEFAULT_DUPLICATE_THRESHOLD: u8 = 80;

/// Source of stores to compare a candidate name against.
pub trait StoreDirectory {
    /// Every store whose region equals `region` exactly (case-sensitive),
    /// oldest first.
    fn stores_in_region(
        &self,
        region: &str,
    ) -> impl Future<Output = Result<Vec<StoreCandidate>, RepositoryError>> + Send;
}

impl<T: StoreDirectory + Sync> StoreDirectory for &T {
    fn stores_in_region(
        &self,
        region: &str,
    ) -> impl Future<Output = Result<Vec<StoreCandidate>, RepositoryError>> + Send {
        (**self).stores_in_region(region)
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Outcome of a single duplicate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateCheck {
    /// Name or region was blank; the directory was not queried.
    Skipped,
    /// Checked, nothing similar.
    NotFound,
    /// Similar stores, in directory order.
    Found(Vec<StoreCandidate>),
    /// The directory query failed.
    Unavailable,
}

impl DuplicateCheck {
    /// Whether the comparison actually ran (or had nothing to compare).
    #[must_use]
    pub const fn was_checked(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// The matching stores; empty unless `Found`.
    #[must_use]
    pub fn into_matches(self) -> Vec<StoreCandidate> {
        match self {
            Self::Found(matches) => matches,
            Self::Skipped | Self::NotFound | Self::Unavailable => Vec::new(),
        }
    }
}

// =============================================================================
// Detector
// =============================================================================

/// Fuzzy duplicate detector over a [`StoreDirectory`].
#[derive(Debug, Clone)]
pub struct DuplicateDetector<D> {
    directory: D,
    threshold: u8,
}

impl<D: StoreDirectory> DuplicateDetector<D> {
    /// Create a detector with the default threshold.
    #[must_use]
    pub const fn new(directory: D) -> Self {
        Self {
            directory,
            threshold: DEFAULT_DUPLICATE_THRESHOLD,
        }
    }

    /// Override the score a name must exceed to count as a duplicate.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold.min(100);
        self
    }

    /// The active threshold.
    #[must_use]
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Check `name` against the stores already in `region`.
    ///
    /// `exclude_id` removes the store being edited from its own results.
    #[instrument(skip(self), fields(threshold = self.threshold))]
    pub async fn check(
        &self,
        name: &str,
        region: &str,
        exclude_id: Option<&StoreId>,
    ) -> DuplicateCheck {
        if name.trim().is_empty() || region.trim().is_empty() {
            return DuplicateCheck::Skipped;
        }

        let candidates = match self.directory.stores_in_region(region).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, region, "Duplicate check failed, continuing without it");
                return DuplicateCheck::Unavailable;
            }
        };

        let matches = find_matches(name, candidates, exclude_id, self.threshold);
        debug!(matches = matches.len(), "Duplicate check complete");

        if matches.is_empty() {
            DuplicateCheck::NotFound
        } else {
            DuplicateCheck::Found(matches)
        }
    }

    /// Soft variant of [`check`](Self::check): every failure collapses to
    /// an empty list.
    pub async fn check_duplicates(
        &self,
        name: &str,
        region: &str,
        exclude_id: Option<&StoreId>,
    ) -> Vec<StoreCandidate> {
        self.check(name, region, exclude_id).await.into_matches()
    }
}

/// Filter `candidates` down to those whose names score above `threshold`.
#[must_use]
pub fn find_matches(
    name: &str,
    candidates: Vec<StoreCandidate>,
    exclude_id: Option<&StoreId>,
    threshold: u8,
) -> Vec<StoreCandidate> {
    let name = name.to_lowercase();

    candidates
        .into_iter()
        .filter(|candidate| exclude_id.is_none_or(|id| candidate.id.as_ref() != Some(id)))
        .filter(|candidate| token_set_ratio(&name, &candidate.name.to_lowercase()) > threshold)
        .collect()
}

// =============================================================================
// In-memory directory
// =============================================================================

/// A [`StoreDirectory`] backed by a vector.
///
/// Used for seeding dry-runs and tests. Counts queries, and can be built to
/// fail every query.
#[derive(Debug, Default)]
pub struct InMemoryStoreDirectory {
    stores: Vec<StoreCandidate>,
    queries: AtomicUsize,
    failing: bool,
}

impl InMemoryStoreDirectory {
    #[must_use]
    pub fn new(stores: Vec<StoreCandidate>) -> Self {
        Self {
            stores,
            ..Self::default()
        }
    }

    /// A directory whose every query fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn insert(&mut self, store: StoreCandidate) {
        self.stores.push(store);
    }

    /// Number of `stores_in_region` calls so far.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl StoreDirectory for InMemoryStoreDirectory {
    fn stores_in_region(
        &self,
        region: &str,
    ) -> impl Future<Output = Result<Vec<StoreCandidate>, RepositoryError>> + Send {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let result: Result<Vec<StoreCandidate>, RepositoryError> = if self.failing {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(self
                .stores
                .iter()
                .filter(|store| store.region == region)
                .cloned()
                .collect())
        };
        std::future::ready(result)
    }
}
