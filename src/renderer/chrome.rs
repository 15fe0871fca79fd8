use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::app::error::{EnrichError, Result};
use crate::config::RenderConfig;

/// Chrome-based renderer using chromiumoxide.
pub struct ChromeRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
    config: RenderConfig,
}

impl ChromeRenderer {
    /// Launch a browser with a fixed viewport.
    pub async fn launch(config: RenderConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .window_size(config.viewport_width, config.viewport_height);

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| EnrichError::Render(format!("failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            EnrichError::Render(format!(
                "failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Drive the CDP event stream until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        Ok(Self {
            browser,
            handler_task,
            config,
        })
    }

    /// Navigate to `url` and capture a JPEG screenshot of the viewport.
    ///
    /// The page is closed on every exit path, including navigation errors
    /// and the render timeout.
    pub async fn screenshot(&self, url: &str) -> Result<Vec<u8>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| EnrichError::Render(format!("failed to create page: {}", e)))?;

        let result =
            match tokio::time::timeout(self.config.navigation_timeout(), self.capture(&page, url))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(EnrichError::Timeout),
            };

        let _ = page.close().await;
        result
    }

    async fn capture(&self, page: &Page, url: &str) -> Result<Vec<u8>> {
        page.goto(url)
            .await
            .map_err(|e| EnrichError::Render(format!("navigation failed: {}", e)))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| EnrichError::Render(format!("navigation failed: {}", e)))?;

        // Let late subresources and scripts settle before capturing.
        tokio::time::sleep(self.config.settle()).await;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(self.config.screenshot_quality as i64)
            .full_page(false)
            .build();

        page.screenshot(params)
            .await
            .map_err(|e| EnrichError::Render(format!("screenshot failed: {}", e)))
    }

    /// Close the browser and wait for the event stream to drain.
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| EnrichError::Render(format!("failed to close browser: {}", e)))?;
        let _ = self.handler_task.await;
        Ok(())
    }
}
