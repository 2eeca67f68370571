//! Core types for store onboarding.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod region;
pub mod stage;

pub use email::{Email, EmailError};
pub use id::StoreId;
pub use region::{Region, RegionError};
pub use stage::{StageError, StoreStage};
