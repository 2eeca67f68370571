//! Store Onboarding Core - Shared types library.
//!
//! This crate provides common types used across all onboarding components:
//! - `admin` - Store onboarding back office (JSON API + duplicate detection)
//! - `cli` - Command-line tools for migrations, seeding and ad-hoc checks
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure conversions - no I/O,
//! no database access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`timestamp`] - Canonical timestamps and the lenient/strict normalizer
//! - [`types`] - Store IDs, contact emails, regions and pipeline stages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod timestamp;
pub mod types;

pub use timestamp::{CanonicalTimestamp, TemporalValue, TimestampError, ToCanonical};
pub use types::*;
