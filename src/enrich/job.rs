use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::app::error::{EnrichError, Result};
use crate::config::EnrichConfig;
use crate::domain::{thumbnail_key, EnrichmentJob, EnrichmentStatus, EnrichmentUpdate, StoredItem};
use crate::enrich::sanitize::{self, ERROR_MAX, EXCERPT_MAX, TITLE_MAX, URL_MAX};
use crate::extractor;
use crate::fetcher::BoundedFetcher;
use crate::metrics::EnrichMetrics;
use crate::store::{BlobStore, ItemStore};
use crate::thumbnail::ThumbnailGenerator;

/// Job-driven deep enrichment: metadata plus a thumbnail.
///
/// Consumes one [`EnrichmentJob`] per invocation. Delivery is at-least-once,
/// so the handler is idempotent: the blob key is derived from
/// `(user_id, item_id)` and re-running simply overwrites it, while
/// `title`/`excerpt` are only filled where the sync path left them empty.
/// The handler holds no mutable state across invocations; cross-job
/// concurrency belongs to the external worker pool.
pub struct AsyncEnricher {
    items: Arc<dyn ItemStore>,
    blobs: Arc<dyn BlobStore>,
    fetcher: Arc<BoundedFetcher>,
    thumbnails: ThumbnailGenerator,
    metrics: Arc<EnrichMetrics>,
    config: EnrichConfig,
}

impl AsyncEnricher {
    pub fn new(
        items: Arc<dyn ItemStore>,
        blobs: Arc<dyn BlobStore>,
        fetcher: Arc<BoundedFetcher>,
        thumbnails: ThumbnailGenerator,
        metrics: Arc<EnrichMetrics>,
        config: EnrichConfig,
    ) -> Self {
        Self {
            items,
            blobs,
            fetcher,
            thumbnails,
            metrics,
            config,
        }
    }

    /// Handle one job end to end.
    ///
    /// On failure the item is marked `Failed` with a user-safe message and
    /// the error is re-raised so the queue applies its retry/dead-letter
    /// policy. A missing item is not an error: the job is logged and
    /// dropped.
    pub async fn handle(&self, job: &EnrichmentJob) -> Result<()> {
        let started = Instant::now();

        let item = match self.items.get_item(&job.user_id, &job.item_id).await? {
            Some(item) => item,
            None => {
                tracing::warn!(
                    user_id = %job.user_id,
                    item_id = %job.item_id,
                    "enrichment job for unknown item, dropping"
                );
                return Ok(());
            }
        };

        match self.enrich(&item, job).await {
            Ok(update) => {
                self.items
                    .apply_enrichment(&job.user_id, &job.item_id, &update)
                    .await?;
                self.metrics.record_job_success(started.elapsed());
                tracing::info!(
                    user_id = %job.user_id,
                    item_id = %job.item_id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "enrichment job complete"
                );
                Ok(())
            }
            Err(err) => {
                self.persist_failure(job, &err).await;
                self.metrics.record_job_failure();
                tracing::warn!(
                    user_id = %job.user_id,
                    item_id = %job.item_id,
                    error = %err,
                    "enrichment job failed"
                );
                Err(err)
            }
        }
    }

    /// Record a terminal failure without re-attempting the fetch. Entry
    /// point for dead-letter consumers after the queue gives up on a job.
    pub async fn mark_failed(&self, job: &EnrichmentJob, err: &EnrichError) -> Result<()> {
        let message = sanitize::truncate_chars(err.user_message(), ERROR_MAX);
        self.items
            .mark_enrichment_failed(&job.user_id, &job.item_id, &message)
            .await?;
        self.metrics.record_job_failure();
        Ok(())
    }

    async fn enrich(&self, item: &StoredItem, job: &EnrichmentJob) -> Result<EnrichmentUpdate> {
        let body = self
            .fetcher
            .fetch(&job.url, &self.config.fetch.page_limits())
            .await?;
        let html = String::from_utf8_lossy(&body);
        let meta = extractor::extract(&html);

        // Keep whatever the sync path already saved.
        let title = match item.title {
            Some(_) => None,
            None => meta
                .title
                .as_deref()
                .and_then(|raw| sanitize::sanitize_text(raw, TITLE_MAX)),
        };
        let excerpt = match item.excerpt {
            Some(_) => None,
            None => meta
                .excerpt
                .as_deref()
                .and_then(|raw| sanitize::sanitize_text(raw, EXCERPT_MAX)),
        };

        let preview_image_url = meta
            .preview_image_url
            .as_deref()
            .and_then(|raw| sanitize::sanitize_url(raw, URL_MAX));

        let thumbnail = self
            .thumbnails
            .generate(&job.url, preview_image_url.as_deref())
            .await?;

        let key = thumbnail_key(&job.user_id, &job.item_id);
        self.blobs.put(&key, &thumbnail, "image/jpeg").await?;

        Ok(EnrichmentUpdate {
            title,
            excerpt,
            thumbnail_key: Some(key),
            status: EnrichmentStatus::Succeeded,
            error: None,
            enriched_at: Some(Utc::now()),
        })
    }

    async fn persist_failure(&self, job: &EnrichmentJob, err: &EnrichError) {
        let message = sanitize::truncate_chars(err.user_message(), ERROR_MAX);
        if let Err(store_err) = self
            .items
            .mark_enrichment_failed(&job.user_id, &job.item_id, &message)
            .await
        {
            tracing::error!(
                user_id = %job.user_id,
                item_id = %job.item_id,
                error = %store_err,
                "failed to record enrichment failure"
            );
        }
    }
}
