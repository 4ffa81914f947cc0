//! Shared types and models for the ZenVit CRM platform
//!
//! This crate contains the domain models and the pure derivation logic
//! (stock status, order line math, customer tiers) used by the backend
//! and its tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
