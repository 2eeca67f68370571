//! Onboarding pipeline stages.

use serde::{Deserialize, Serialize};

/// Error for unknown stage names and disallowed transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("invalid store stage: {0}")]
    Unknown(String),
    #[error("cannot move a store from {from} to {to}")]
    InvalidTransition { from: StoreStage, to: StoreStage },
}

/// Where a store sits in the onboarding pipeline.
///
/// ```text
/// lead ──> cold <──> warm ──> closed ──> rollout
///   └──────────────────^
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreStage {
    /// First contact, not yet qualified.
    #[default]
    Lead,
    /// Qualified but not currently engaged.
    Cold,
    /// Actively engaged.
    Warm,
    /// Deal signed.
    Closed,
    /// Store is being (or has been) launched.
    Rollout,
}

impl StoreStage {
    /// Returns true if a store in `self` may move to `next`.
    ///
    /// Staying put is always allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Lead, Self::Lead | Self::Cold | Self::Warm)
                | (Self::Cold, Self::Cold | Self::Warm | Self::Closed)
                | (Self::Warm, Self::Warm | Self::Cold | Self::Closed)
                | (Self::Closed, Self::Closed | Self::Rollout)
                | (Self::Rollout, Self::Rollout)
        )
    }

    /// Validate a transition.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidTransition`] if the move is not allowed.
    pub const fn transition_to(self, next: Self) -> Result<Self, StageError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StageError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Storage/wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Cold => "cold",
            Self::Warm => "warm",
            Self::Closed => "closed",
            Self::Rollout => "rollout",
        }
    }
}

impl std::fmt::Display for StoreStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StoreStage {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead" => Ok(Self::Lead),
            "cold" => Ok(Self::Cold),
            "warm" => Ok(Self::Warm),
            "closed" => Ok(Self::Closed),
            "rollout" => Ok(Self::Rollout),
            _ => Err(StageError::Unknown(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(StoreStage::Lead.can_transition_to(StoreStage::Cold));
        assert!(StoreStage::Lead.can_transition_to(StoreStage::Warm));
        assert!(StoreStage::Cold.can_transition_to(StoreStage::Warm));
        assert!(StoreStage::Warm.can_transition_to(StoreStage::Cold));
        assert!(StoreStage::Warm.can_transition_to(StoreStage::Closed));
        assert!(StoreStage::Closed.can_transition_to(StoreStage::Rollout));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!StoreStage::Lead.can_transition_to(StoreStage::Closed));
        assert!(!StoreStage::Lead.can_transition_to(StoreStage::Rollout));
        assert!(!StoreStage::Rollout.can_transition_to(StoreStage::Lead));
        assert!(!StoreStage::Closed.can_transition_to(StoreStage::Warm));

        assert_eq!(
            StoreStage::Cold.transition_to(StoreStage::Rollout),
            Err(StageError::InvalidTransition {
                from: StoreStage::Cold,
                to: StoreStage::Rollout,
            })
        );
    }

    #[test]
    fn test_same_stage_is_always_allowed() {
        for stage in [
            StoreStage::Lead,
            StoreStage::Cold,
            StoreStage::Warm,
            StoreStage::Closed,
            StoreStage::Rollout,
        ] {
            assert_eq!(stage.transition_to(stage).unwrap(), stage);
            assert_eq!(stage.as_str().parse::<StoreStage>().unwrap(), stage);
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(
            "prospect".parse::<StoreStage>(),
            Err(StageError::Unknown(_))
        ));
    }
}
