//! Seams to the externally-owned item and blob stores.
//!
//! Persistence of items lives outside this crate; the enrichment pipeline
//! only reads a small projection and writes enrichment results back through
//! these traits. [`memory`] provides in-process implementations for tests
//! and local wiring.

pub mod memory;

pub use memory::{MemoryBlobStore, MemoryItemStore};

use async_trait::async_trait;

use crate::app::error::Result;
use crate::domain::{EnrichmentUpdate, StoredItem};

/// Item persistence, keyed by `(user_id, item_id)`.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get_item(&self, user_id: &str, item_id: &str) -> Result<Option<StoredItem>>;

    /// Apply a successful enrichment. `None` fields are left untouched.
    async fn apply_enrichment(
        &self,
        user_id: &str,
        item_id: &str,
        update: &EnrichmentUpdate,
    ) -> Result<()>;

    /// Record a failed enrichment with a user-safe, length-capped message.
    async fn mark_enrichment_failed(
        &self,
        user_id: &str,
        item_id: &str,
        message: &str,
    ) -> Result<()>;
}

/// Binary blob persistence for thumbnails.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;
}
