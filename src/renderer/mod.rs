//! Headless page rendering for screenshot thumbnails.
//!
//! The browser is an expensive, process-wide resource: [`SharedRenderer`]
//! launches it lazily on first use, serializes renders through it, and
//! releases it deterministically via [`shutdown`](SharedRenderer::shutdown).
//! Each render opens one page and closes it on every exit path.

pub mod chrome;

pub use chrome::ChromeRenderer;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::app::error::{EnrichError, Result};
use crate::config::RenderConfig;

/// A headless-rendering engine: navigate to a URL and return a JPEG
/// screenshot at the configured viewport and quality.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn screenshot(&self, url: &str) -> Result<Vec<u8>>;
}

/// Lazily-initialized owner of the one [`ChromeRenderer`] in the process.
pub struct SharedRenderer {
    config: RenderConfig,
    inner: Mutex<Option<ChromeRenderer>>,
}

impl SharedRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(None),
        }
    }

    /// Close the browser if it was ever launched. Must be called before
    /// process exit; dropping the handle does not stop the browser process.
    pub async fn shutdown(&self) -> Result<()> {
        let mut guard = self.inner.lock().await;
        if let Some(renderer) = guard.take() {
            tracing::info!("shutting down headless browser");
            renderer.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Renderer for SharedRenderer {
    async fn screenshot(&self, url: &str) -> Result<Vec<u8>> {
        // The lock is held for the whole render; screenshots are rare and
        // serializing them keeps browser memory flat.
        let mut guard = self.inner.lock().await;

        if guard.is_none() {
            tracing::info!("launching headless browser");
            *guard = Some(ChromeRenderer::launch(self.config.clone()).await?);
        }

        let renderer = guard
            .as_ref()
            .ok_or_else(|| EnrichError::Render("renderer unavailable".to_string()))?;

        renderer.screenshot(url).await
    }
}
