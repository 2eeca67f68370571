//! Store domain models.

use serde::{Deserialize, Deserializer, Serialize};

use onboarding_core::{CanonicalTimestamp, Email, Region, StoreId, StoreStage, TemporalValue};

/// A store in the onboarding pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Trading name shown to the team.
    pub name: String,
    /// Province the store trades in.
    pub region: Region,
    /// Pipeline stage.
    pub stage: StoreStage,
    /// Primary contact person.
    pub contact_name: Option<String>,
    /// Primary contact email.
    pub contact_email: Option<Email>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Planned or actual launch.
    pub launch_at: Option<CanonicalTimestamp>,
    /// When the store was created.
    pub created_at: CanonicalTimestamp,
    /// When the store was last updated.
    pub updated_at: CanonicalTimestamp,
}

impl Store {
    /// The duplicate-check view of this store.
    #[must_use]
    pub fn candidate(&self) -> StoreCandidate {
        StoreCandidate {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            region: self.region.to_string(),
        }
    }
}

/// The subset of a store record relevant to duplicate checking.
///
/// `region` is the raw stored string: matching is exact, so it is never
/// parsed or normalized on the way through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCandidate {
    /// Absent for stores that have not been saved yet.
    pub id: Option<StoreId>,
    /// Display name.
    pub name: String,
    /// Region as stored.
    pub region: String,
}

impl StoreCandidate {
    /// Convenience constructor for an existing store.
    #[must_use]
    pub fn new(id: impl Into<StoreId>, name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            region: region.into(),
        }
    }
}

/// Validated input for inserting a store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub region: Region,
    pub stage: StoreStage,
    pub contact_name: Option<String>,
    pub contact_email: Option<Email>,
    pub notes: Option<String>,
    pub launch_at: Option<CanonicalTimestamp>,
}

/// Partial update for a store.
///
/// `None` leaves a field unchanged. For `launch_at`, an explicit JSON `null`
/// arrives as `Some(TemporalValue::Missing)` and clears the launch date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub region: Option<String>,
    pub stage: Option<StoreStage>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub launch_at: Option<TemporalValue>,
}

/// Filters for listing stores.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreFilter {
    pub region: Option<Region>,
    pub stage: Option<StoreStage>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Deserialize a field that is present (even as `null`) into `Some`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None`.
///
/// # Errors
///
/// Propagates the inner deserializer's error.
pub fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<TemporalValue>, D::Error>
where
    D: Deserializer<'de>,
{
    TemporalValue::deserialize(deserializer).map(Some)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changes_distinguish_absent_from_null_launch() {
        let absent: StoreChanges = serde_json::from_value(json!({"name": "Corner Cafe"})).unwrap();
        assert!(absent.launch_at.is_none());

        let cleared: StoreChanges = serde_json::from_value(json!({"launch_at": null})).unwrap();
        assert_eq!(cleared.launch_at, Some(TemporalValue::Missing));

        let set: StoreChanges =
            serde_json::from_value(json!({"launch_at": "2024-03-01"})).unwrap();
        assert_eq!(
            set.launch_at,
            Some(TemporalValue::Text("2024-03-01".to_string()))
        );
    }

    #[test]
    fn test_candidate_keeps_region_display_name() {
        let now = CanonicalTimestamp::now();
        let store = Store {
            id: StoreId::new("1"),
            name: "Corner Cafe".to_string(),
            region: Region::KwaZuluNatal,
            stage: StoreStage::Lead,
            contact_name: None,
            contact_email: None,
            notes: None,
            launch_at: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(
            store.candidate(),
            StoreCandidate::new("1", "Corner Cafe", "KwaZulu-Natal")
        );
    }
}
