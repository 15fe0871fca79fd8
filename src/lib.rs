//! # Satchel Enrich
//!
//! Content enrichment pipeline for Satchel, a save-URLs-for-later-reading
//! service. Given a saved URL, the pipeline safely fetches the page,
//! extracts metadata (title, excerpt, preview image), and produces a JPEG
//! thumbnail, while defending against SSRF, unbounded responses, and
//! redirect abuse.
//!
//! ## Architecture
//!
//! ```text
//! save request ──► SyncEnricher ──► SyncEnrichmentResult
//!                      │                    │ needs_async_fallback
//!                      ▼                    ▼
//!                 BoundedFetcher       job queue (external)
//!                      │                    │
//!                      ▼                    ▼
//!                 SsrfValidator        AsyncEnricher ──► ItemStore/BlobStore
//!                                           │
//!                                           ▼
//!                                  ThumbnailGenerator ──► SharedRenderer
//! ```
//!
//! Two tiers share one contract: the sync pass runs inline at save time
//! under a strict deadline and reports `needs_async_fallback` when it could
//! not fully enrich; the caller then enqueues an [`EnrichmentJob`] for the
//! async pass, which also renders a thumbnail. Item, blob, and queue
//! persistence are external collaborators behind traits.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use satchel_enrich::app::EnrichContext;
//! use satchel_enrich::config::EnrichConfig;
//!
//! let ctx = EnrichContext::new(EnrichConfig::default(), items, blobs)?;
//!
//! // At save time:
//! let result = ctx.sync.enrich(&url, &user_id, &item_id).await;
//! if result.needs_async_fallback {
//!     // enqueue an EnrichmentJob through your queue
//! }
//!
//! // In the queue worker:
//! ctx.jobs.handle(&job).await?;
//!
//! // On shutdown:
//! ctx.shutdown().await?;
//! ```

/// Pipeline wiring ([`EnrichContext`](app::EnrichContext)), error taxonomy,
/// and tracing setup.
pub mod app;

/// Configuration: fetch limits, sync budgets, thumbnail and render settings.
pub mod config;

/// Domain types: [`EnrichmentJob`](domain::EnrichmentJob), stored-item
/// projection, enrichment status.
pub mod domain;

/// Sync and async orchestrators plus sanitization and deadline composition.
pub mod enrich;

/// HTML → metadata extraction (pure, no I/O).
pub mod extractor;

/// Bounded, SSRF-checked outbound fetching.
pub mod fetcher;

/// Counters and duration samples for external metrics sinks.
pub mod metrics;

/// Headless rendering behind the [`Renderer`](renderer::Renderer) trait,
/// with a lazily-launched shared Chrome instance.
pub mod renderer;

/// SSRF validation of outbound URLs.
pub mod security;

/// Item/blob store collaborator traits and in-memory implementations.
pub mod store;

/// Thumbnail generation: preview image or screenshot, resized to JPEG.
pub mod thumbnail;

pub use app::{EnrichError, Result};
pub use domain::EnrichmentJob;
pub use enrich::{AsyncEnricher, SyncEnricher, SyncEnrichmentResult};
pub use extractor::PageMetadata;
pub use security::{SsrfValidationResult, SsrfValidator};
