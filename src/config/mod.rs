//! Configuration for the enrichment pipeline.
//!
//! All sections have working defaults; hosts typically load overrides from
//! a TOML file and pass the result to
//! [`EnrichContext::new`](crate::app::EnrichContext::new). Missing fields
//! fall back to defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::error::{EnrichError, Result};
use crate::fetcher::FetchLimits;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub fetch: FetchConfig,
    pub sync: SyncConfig,
    pub thumbnail: ThumbnailConfig,
    pub render: RenderConfig,
}

impl EnrichConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|err| {
            EnrichError::Config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| EnrichError::Config(err.to_string()))
    }
}

/// Limits for outbound HTTP fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,

    /// Redirect hops to follow before failing.
    pub max_redirects: usize,

    /// Size cap for page HTML (bytes).
    pub page_max_bytes: usize,

    /// Wall-clock budget for an async-path page fetch, in milliseconds.
    /// The sync path uses its own tighter budget.
    pub page_timeout_ms: u64,

    /// Size cap for preview images (bytes).
    pub image_max_bytes: usize,

    /// Wall-clock budget for an image fetch, in milliseconds.
    pub image_timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "SatchelBot/0.1 (+https://satchel.app/bot)".to_string(),
            max_redirects: 5,
            page_max_bytes: 2 * 1024 * 1024,
            page_timeout_ms: 10_000,
            image_max_bytes: 10 * 1024 * 1024,
            image_timeout_ms: 10_000,
        }
    }
}

impl FetchConfig {
    pub fn page_limits(&self) -> FetchLimits {
        FetchLimits::new(
            self.page_max_bytes,
            Duration::from_millis(self.page_timeout_ms),
            self.max_redirects,
        )
    }

    pub fn image_limits(&self) -> FetchLimits {
        FetchLimits::new(
            self.image_max_bytes,
            Duration::from_millis(self.image_timeout_ms),
            self.max_redirects,
        )
    }
}

/// Time budgets for the synchronous enrichment pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Master deadline for the whole sync attempt, in milliseconds.
    pub total_budget_ms: u64,

    /// Nested fetch deadline; the effective fetch budget is the earlier of
    /// this and the master deadline.
    pub fetch_budget_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            total_budget_ms: 4_000,
            fetch_budget_ms: 2_500,
        }
    }
}

impl SyncConfig {
    pub fn total_budget(&self) -> Duration {
        Duration::from_millis(self.total_budget_ms)
    }

    pub fn fetch_budget(&self) -> Duration {
        Duration::from_millis(self.fetch_budget_ms)
    }
}

/// Output dimensions and encoding for thumbnails.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_width: 600,
            max_height: 400,
            jpeg_quality: 80,
        }
    }
}

/// Headless browser settings for screenshot fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Budget for navigate + settle + capture, in milliseconds.
    pub navigation_timeout_ms: u64,

    /// Extra wait after the load event so dynamic content settles.
    pub settle_ms: u64,

    pub screenshot_quality: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            navigation_timeout_ms: 15_000,
            settle_ms: 1_000,
            screenshot_quality: 75,
        }
    }
}

impl RenderConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
