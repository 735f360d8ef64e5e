//! Core data model definitions shared across pixmill crates.
#![allow(missing_docs)]

pub mod batch;
pub mod catalog;
pub mod ids;

// Intentionally curated re-exports for downstream consumers.
pub use batch::{Batch, BatchStatus};
pub use catalog::{CatalogRow, ImageUnit, PENDING_SENTINEL, UnitOutcome};
pub use ids::BatchId;
