//! Domain models for the onboarding back office.

pub mod store;

pub use store::{
    NewStore, Store, StoreCandidate, StoreChanges, StoreFilter, deserialize_present,
};
