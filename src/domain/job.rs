use serde::{Deserialize, Serialize};

use crate::app::error::{EnrichError, Result};

/// Message consumed from the job queue, one per deferred enrichment.
///
/// Produced by the external save pathway when the sync attempt reports
/// `needs_async_fallback`; delivered at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentJob {
    pub item_id: String,
    pub user_id: String,
    pub url: String,
}

impl EnrichmentJob {
    pub fn new(
        item_id: impl Into<String>,
        user_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            user_id: user_id.into(),
            url: url.into(),
        }
    }

    /// Decode a queue payload.
    pub fn from_json(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload)
            .map_err(|err| EnrichError::Other(format!("invalid job payload: {}", err)))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|err| EnrichError::Other(format!("failed to encode job: {}", err)))
    }
}
