use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The slice of an item this pipeline reads. The full item entity (tags,
/// collections, read state) is owned by the external store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub excerpt: Option<String>,
}

impl StoredItem {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            title: None,
            excerpt: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStatus {
    Pending,
    Succeeded,
    Failed,
}

impl EnrichmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentStatus::Pending => "pending",
            EnrichmentStatus::Succeeded => "succeeded",
            EnrichmentStatus::Failed => "failed",
        }
    }
}

/// Fields written back to the item store after an async enrichment attempt.
/// `None` content fields mean "leave the stored value alone".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentUpdate {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub thumbnail_key: Option<String>,
    pub status: EnrichmentStatus,
    pub error: Option<String>,
    pub enriched_at: Option<DateTime<Utc>>,
}

impl EnrichmentUpdate {
    pub fn failed(message: &str) -> Self {
        Self {
            title: None,
            excerpt: None,
            thumbnail_key: None,
            status: EnrichmentStatus::Failed,
            error: Some(message.to_string()),
            enriched_at: None,
        }
    }
}

/// Blob-store key for an item's thumbnail. Deterministic so that re-running
/// a job overwrites instead of accumulating blobs.
pub fn thumbnail_key(user_id: &str, item_id: &str) -> String {
    format!("thumbnails/{}/{}.jpg", user_id, item_id)
}
