//! Bounded, SSRF-checked outbound fetching.
//!
//! The fetcher owns the redirect loop (automatic following is disabled on
//! the HTTP client) so that every redirect target is re-validated before a
//! request is issued, and streams bodies chunk by chunk so an oversized
//! response is aborted mid-stream instead of buffered.

pub mod bounded;

pub use bounded::BoundedFetcher;

use std::time::Duration;

/// Per-call limits for a bounded fetch.
#[derive(Debug, Clone)]
pub struct FetchLimits {
    /// Abort the body read the instant the running total would exceed this.
    pub max_bytes: usize,
    /// Wall-clock budget for the whole call, redirects included.
    pub timeout: Duration,
    /// Redirect hops to follow before giving up.
    pub max_redirects: usize,
}

impl FetchLimits {
    pub fn new(max_bytes: usize, timeout: Duration, max_redirects: usize) -> Self {
        Self {
            max_bytes,
            timeout,
            max_redirects,
        }
    }

    /// Same limits with a tighter wall-clock budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
