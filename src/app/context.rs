use std::sync::Arc;

use crate::app::error::Result;
use crate::config::EnrichConfig;
use crate::enrich::{AsyncEnricher, SyncEnricher};
use crate::fetcher::BoundedFetcher;
use crate::metrics::EnrichMetrics;
use crate::renderer::SharedRenderer;
use crate::store::{BlobStore, ItemStore};
use crate::thumbnail::ThumbnailGenerator;

/// Wires the enrichment pipeline together for a host process.
///
/// The item and blob stores are external collaborators supplied by the
/// caller; everything else (fetcher, renderer, orchestrators, metrics) is
/// owned here. Call [`shutdown`](EnrichContext::shutdown) before process
/// exit so the headless browser is released deterministically.
pub struct EnrichContext {
    pub sync: SyncEnricher,
    pub jobs: AsyncEnricher,
    pub renderer: Arc<SharedRenderer>,
    pub metrics: Arc<EnrichMetrics>,
}

impl EnrichContext {
    pub fn new(
        config: EnrichConfig,
        items: Arc<dyn ItemStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Result<Self> {
        let metrics = Arc::new(EnrichMetrics::new());
        let fetcher = Arc::new(BoundedFetcher::new(&config.fetch.user_agent)?);
        let renderer = Arc::new(SharedRenderer::new(config.render.clone()));

        let thumbnails = ThumbnailGenerator::new(
            fetcher.clone(),
            renderer.clone(),
            config.thumbnail.clone(),
            config.fetch.image_limits(),
        );

        let sync = SyncEnricher::new(fetcher.clone(), &config, metrics.clone());
        let jobs = AsyncEnricher::new(items, blobs, fetcher, thumbnails, metrics.clone(), config);

        Ok(Self {
            sync,
            jobs,
            renderer,
            metrics,
        })
    }

    /// Release the shared headless browser, if one was ever launched.
    pub async fn shutdown(&self) -> Result<()> {
        self.renderer.shutdown().await
    }
}
