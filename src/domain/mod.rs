//! Core domain types for the enrichment pipeline.

pub mod item;
pub mod job;

pub use item::{thumbnail_key, EnrichmentStatus, EnrichmentUpdate, StoredItem};
pub use job::EnrichmentJob;
