//! Business logic services for the onboarding admin.
//!
//! # Services
//!
//! - `duplicates` - Fuzzy duplicate store detection per region
//! - `similarity` - Token-set string similarity scoring
//! - `stores` - Store create/update flow with duplicate confirmation

pub mod duplicates;
pub mod similarity;
pub mod stores;

pub use duplicates::{
    DEFAULT_DUPLICATE_THRESHOLD, DuplicateCheck, DuplicateDetector, InMemoryStoreDirectory,
    StoreDirectory,
};
pub use similarity::token_set_ratio;
pub use stores::{CreateStoreInput, SaveOutcome, StoreService, StoreServiceError};
