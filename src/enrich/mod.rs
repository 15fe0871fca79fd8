//! Enrichment orchestrators.
//!
//! Two tiers with a fallback contract between them:
//!
//! - [`SyncEnricher`]: single-pass validate → fetch → extract → sanitize
//!   inside the caller's request flow, under a strict master deadline.
//!   Returns a [`SyncEnrichmentResult`] whose `needs_async_fallback` flag is
//!   the one signal callers use to decide whether to enqueue a job.
//! - [`AsyncEnricher`]: job-driven deep enrichment including thumbnail
//!   generation, persisting through the external item/blob stores.
//!
//! Neither tier retries anything; retry policy belongs to the job queue.

pub mod deadline;
pub mod job;
pub mod sanitize;
pub mod sync;

pub use deadline::Deadline;
pub use job::AsyncEnricher;
pub use sync::SyncEnricher;

use std::time::Duration;

/// Outcome of a synchronous enrichment attempt.
///
/// Exactly one of three shapes reaches the caller:
///
/// - success: content fields populated, `needs_async_fallback == false`
/// - definitive block: `needs_async_fallback == false`, `error` set
/// - soft defer: all content fields `None`, `needs_async_fallback == true`,
///   `error == None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEnrichmentResult {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub preview_image_url: Option<String>,
    pub needs_async_fallback: bool,
    pub error: Option<String>,
    pub duration: Duration,
}

impl SyncEnrichmentResult {
    /// Definitive SSRF rejection. Never deferred, never retried.
    pub(crate) fn blocked() -> Self {
        Self {
            title: None,
            excerpt: None,
            preview_image_url: None,
            needs_async_fallback: false,
            error: Some("URL blocked.".to_string()),
            duration: Duration::ZERO,
        }
    }

    /// Soft failure: the caller saves the item as-is and enqueues a job.
    pub(crate) fn deferred() -> Self {
        Self {
            title: None,
            excerpt: None,
            preview_image_url: None,
            needs_async_fallback: true,
            error: None,
            duration: Duration::ZERO,
        }
    }
}
