use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::error::{EnrichError, Result};
use crate::domain::{EnrichmentUpdate, StoredItem};
use crate::store::{BlobStore, ItemStore};

/// In-memory item store for tests and local wiring.
#[derive(Default)]
pub struct MemoryItemStore {
    items: Mutex<HashMap<(String, String), StoredItem>>,
    updates: Mutex<HashMap<(String, String), EnrichmentUpdate>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, item: StoredItem) {
        let key = (item.user_id.clone(), item.id.clone());
        self.items
            .lock()
            .expect("item store lock poisoned")
            .insert(key, item);
    }

    /// Last enrichment update recorded for an item, if any.
    pub fn last_update(&self, user_id: &str, item_id: &str) -> Option<EnrichmentUpdate> {
        self.updates
            .lock()
            .expect("item store lock poisoned")
            .get(&(user_id.to_string(), item_id.to_string()))
            .cloned()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn get_item(&self, user_id: &str, item_id: &str) -> Result<Option<StoredItem>> {
        Ok(self
            .items
            .lock()
            .map_err(|_| EnrichError::Storage("item store lock poisoned".to_string()))?
            .get(&(user_id.to_string(), item_id.to_string()))
            .cloned())
    }

    async fn apply_enrichment(
        &self,
        user_id: &str,
        item_id: &str,
        update: &EnrichmentUpdate,
    ) -> Result<()> {
        let key = (user_id.to_string(), item_id.to_string());

        let mut items = self
            .items
            .lock()
            .map_err(|_| EnrichError::Storage("item store lock poisoned".to_string()))?;
        if let Some(item) = items.get_mut(&key) {
            if let Some(title) = &update.title {
                item.title = Some(title.clone());
            }
            if let Some(excerpt) = &update.excerpt {
                item.excerpt = Some(excerpt.clone());
            }
        }
        drop(items);

        self.updates
            .lock()
            .map_err(|_| EnrichError::Storage("item store lock poisoned".to_string()))?
            .insert(key, update.clone());
        Ok(())
    }

    async fn mark_enrichment_failed(
        &self,
        user_id: &str,
        item_id: &str,
        message: &str,
    ) -> Result<()> {
        self.updates
            .lock()
            .map_err(|_| EnrichError::Storage("item store lock poisoned".to_string()))?
            .insert(
                (user_id.to_string(), item_id.to_string()),
                EnrichmentUpdate::failed(message),
            );
        Ok(())
    }
}

/// In-memory blob store.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .expect("blob store lock poisoned")
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().expect("blob store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<()> {
        self.blobs
            .lock()
            .map_err(|_| EnrichError::Storage("blob store lock poisoned".to_string()))?
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EnrichmentStatus;

    #[tokio::test]
    async fn test_get_item_returns_inserted_item() {
        let store = MemoryItemStore::new();
        store.insert(StoredItem::new("i1", "u1"));
        let item = store.get_item("u1", "i1").await.unwrap().unwrap();
        assert_eq!(item.id, "i1");
        assert!(store.get_item("u2", "i1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_apply_enrichment_fills_item_fields() {
        let store = MemoryItemStore::new();
        store.insert(StoredItem::new("i1", "u1"));

        let update = EnrichmentUpdate {
            title: Some("Title".to_string()),
            excerpt: None,
            thumbnail_key: Some("thumbnails/u1/i1.jpg".to_string()),
            status: EnrichmentStatus::Succeeded,
            error: None,
            enriched_at: Some(chrono::Utc::now()),
        };
        store.apply_enrichment("u1", "i1", &update).await.unwrap();

        let item = store.get_item("u1", "i1").await.unwrap().unwrap();
        assert_eq!(item.title.as_deref(), Some("Title"));
        assert!(item.excerpt.is_none());
        assert_eq!(
            store.last_update("u1", "i1").unwrap().status,
            EnrichmentStatus::Succeeded
        );
    }

    #[tokio::test]
    async fn test_mark_failed_records_message() {
        let store = MemoryItemStore::new();
        store.insert(StoredItem::new("i1", "u1"));
        store
            .mark_enrichment_failed("u1", "i1", "Fetch timed out.")
            .await
            .unwrap();

        let update = store.last_update("u1", "i1").unwrap();
        assert_eq!(update.status, EnrichmentStatus::Failed);
        assert_eq!(update.error.as_deref(), Some("Fetch timed out."));
    }

    #[tokio::test]
    async fn test_blob_store_round_trip() {
        let blobs = MemoryBlobStore::new();
        blobs.put("k", &[1, 2, 3], "image/jpeg").await.unwrap();
        assert_eq!(blobs.get("k").unwrap(), vec![1, 2, 3]);
        assert!(blobs.get("missing").is_none());
    }
}
