use std::sync::Arc;
use std::time::Instant;

use crate::app::error::EnrichError;
use crate::config::{EnrichConfig, SyncConfig};
use crate::enrich::deadline::Deadline;
use crate::enrich::sanitize::{self, EXCERPT_MAX, TITLE_MAX, URL_MAX};
use crate::enrich::SyncEnrichmentResult;
use crate::extractor;
use crate::fetcher::{BoundedFetcher, FetchLimits};
use crate::metrics::EnrichMetrics;

/// Fast, best-effort enrichment inside the caller's request flow.
///
/// Runs under a master deadline with a tighter nested fetch deadline. The
/// failure contract is deliberately asymmetric: an SSRF rejection is the
/// only definitive, user-visible failure; everything else collapses into a
/// silent "defer to async" outcome so the caller can save the item
/// immediately and let the background job finish the work.
pub struct SyncEnricher {
    fetcher: Arc<BoundedFetcher>,
    page_limits: FetchLimits,
    config: SyncConfig,
    metrics: Arc<EnrichMetrics>,
}

impl SyncEnricher {
    pub fn new(
        fetcher: Arc<BoundedFetcher>,
        config: &EnrichConfig,
        metrics: Arc<EnrichMetrics>,
    ) -> Self {
        Self {
            fetcher,
            page_limits: config.fetch.page_limits(),
            config: config.sync.clone(),
            metrics,
        }
    }

    /// Enrich `url` synchronously. `user_id` and `item_id` are correlation
    /// only; nothing is persisted here.
    pub async fn enrich(&self, url: &str, user_id: &str, item_id: &str) -> SyncEnrichmentResult {
        let started = Instant::now();
        self.metrics.record_sync_attempt();

        let master = Deadline::after(self.config.total_budget());
        let mut result = match tokio::time::timeout(master.remaining(), self.run(url, master)).await
        {
            Ok(result) => result,
            // Master deadline fired: swallow and defer.
            Err(_) => SyncEnrichmentResult::deferred(),
        };
        result.duration = started.elapsed();

        if result.error.is_some() {
            self.metrics.record_sync_blocked();
            tracing::info!(user_id, item_id, url, "sync enrichment blocked");
        } else if result.needs_async_fallback {
            self.metrics.record_sync_deferred();
            tracing::debug!(
                user_id,
                item_id,
                duration_ms = result.duration.as_millis() as u64,
                "sync enrichment deferred to async"
            );
        } else {
            tracing::debug!(
                user_id,
                item_id,
                duration_ms = result.duration.as_millis() as u64,
                "sync enrichment complete"
            );
        }

        result
    }

    async fn run(&self, url: &str, master: Deadline) -> SyncEnrichmentResult {
        // The fetcher re-validates before requesting, so a block surfaces as
        // a BlockedUrl error straight from the fetch; there is no separate
        // pre-validation pass that a redirect could bypass.
        let fetch_deadline = master.earliest(Deadline::after(self.config.fetch_budget()));
        let limits = self
            .page_limits
            .clone()
            .with_timeout(fetch_deadline.remaining());

        let body = match self.fetcher.fetch(url, &limits).await {
            Ok(body) => body,
            // Definitive: never deferred, never retried.
            Err(EnrichError::BlockedUrl(_)) => return SyncEnrichmentResult::blocked(),
            // Timeout, network trouble, oversize, anything else: defer.
            Err(_) => return SyncEnrichmentResult::deferred(),
        };

        let html = String::from_utf8_lossy(&body);
        let meta = extractor::extract(&html);

        let title = meta
            .title
            .as_deref()
            .and_then(|raw| sanitize::sanitize_text(raw, TITLE_MAX));
        let excerpt = meta
            .excerpt
            .as_deref()
            .and_then(|raw| sanitize::sanitize_text(raw, EXCERPT_MAX));
        let preview_image_url = meta
            .preview_image_url
            .as_deref()
            .and_then(|raw| sanitize::sanitize_url(raw, URL_MAX));

        SyncEnrichmentResult {
            needs_async_fallback: preview_image_url.is_none(),
            title,
            excerpt,
            preview_image_url,
            error: None,
            duration: std::time::Duration::ZERO,
        }
    }
}
