//! Thumbnail generation with a stateful fallback chain.
//!
//! Preferred source is the page's declared preview image; when that is
//! absent, unfetchable, or undecodable, the page itself is screenshotted
//! through the shared headless renderer. Both sources funnel through the
//! same resize routine and come out as JPEG.

use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::app::error::{EnrichError, Result};
use crate::config::ThumbnailConfig;
use crate::fetcher::{BoundedFetcher, FetchLimits};
use crate::renderer::Renderer;

pub struct ThumbnailGenerator {
    fetcher: Arc<BoundedFetcher>,
    renderer: Arc<dyn Renderer>,
    config: ThumbnailConfig,
    image_limits: FetchLimits,
}

impl ThumbnailGenerator {
    pub fn new(
        fetcher: Arc<BoundedFetcher>,
        renderer: Arc<dyn Renderer>,
        config: ThumbnailConfig,
        image_limits: FetchLimits,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            config,
            image_limits,
        }
    }

    /// Produce JPEG thumbnail bytes for a page.
    ///
    /// A blocked preview-image URL is not retried via screenshot of that
    /// URL; the screenshot targets the page itself, which was already
    /// validated when its HTML was fetched.
    pub async fn generate(
        &self,
        page_url: &str,
        preview_image_url: Option<&str>,
    ) -> Result<Vec<u8>> {
        if let Some(image_url) = preview_image_url {
            match self.from_image_url(image_url).await {
                Ok(bytes) => return Ok(bytes),
                Err(err) => {
                    tracing::debug!(
                        image_url,
                        error = %err,
                        "preview image unusable, falling back to screenshot"
                    );
                }
            }
        }

        let screenshot = self.renderer.screenshot(page_url).await?;
        self.resize(&screenshot)
    }

    /// Fetch a known image URL (SSRF-validated like any other fetch) and
    /// resize it.
    async fn from_image_url(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self.fetcher.fetch(url, &self.image_limits).await?;
        self.resize(&bytes)
    }

    fn resize(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        resize_jpeg(
            bytes,
            self.config.max_width,
            self.config.max_height,
            self.config.jpeg_quality,
        )
    }
}

/// Scale an image to fit within `max_width` × `max_height` and re-encode it
/// as JPEG at `quality`.
///
/// The scale factor is `min(max_width/w, max_height/h)`, clamped to 1.0 so
/// small sources are never upscaled; resulting dimensions are floored and
/// kept at 1 px minimum.
pub fn resize_jpeg(bytes: &[u8], max_width: u32, max_height: u32, quality: u8) -> Result<Vec<u8>> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| EnrichError::InvalidImage(format!("unrecognized format: {}", err)))?
        .decode()
        .map_err(|err| EnrichError::InvalidImage(format!("decode failed: {}", err)))?;

    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(EnrichError::InvalidImage("zero-sized image".to_string()));
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    )
    .min(1.0);

    let new_width = ((width as f64 * scale).floor() as u32).max(1);
    let new_height = ((height as f64 * scale).floor() as u32).max(1);

    let resized = if (new_width, new_height) == (width, height) {
        image
    } else {
        image.resize_exact(new_width, new_height, FilterType::Triangle)
    };

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut out = Vec::new();
    let mut cursor = Cursor::new(&mut out);
    let encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| EnrichError::InvalidImage(format!("encode failed: {}", err)))?;

    Ok(out)
}
