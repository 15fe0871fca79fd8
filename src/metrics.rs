//! Counters and duration samples for the enrichment pipeline.
//!
//! The externally-owned metrics sink pulls a [`MetricsSnapshot`] on its own
//! schedule; this module only accumulates. Atomics for counters, a capped
//! sample buffer for job durations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// Keep at most this many duration samples; older samples are overwritten
/// ring-buffer style.
const MAX_DURATION_SAMPLES: usize = 1024;

#[derive(Debug, Default)]
pub struct EnrichMetrics {
    jobs_succeeded: AtomicU64,
    jobs_failed: AtomicU64,
    sync_attempts: AtomicU64,
    sync_deferred: AtomicU64,
    sync_blocked: AtomicU64,
    job_duration_samples: RwLock<Vec<u64>>,
    next_sample_slot: AtomicU64,
}

/// Point-in-time view for external sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
    pub sync_attempts: u64,
    pub sync_deferred: u64,
    pub sync_blocked: u64,
    pub job_duration_p50_ms: Option<u64>,
    pub job_duration_p95_ms: Option<u64>,
}

impl EnrichMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_job_success(&self, duration: Duration) {
        self.jobs_succeeded.fetch_add(1, Ordering::Relaxed);
        self.record_duration(duration);
    }

    pub fn record_job_failure(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sync_attempt(&self) {
        self.sync_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sync_deferred(&self) {
        self.sync_deferred.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sync_blocked(&self) {
        self.sync_blocked.fetch_add(1, Ordering::Relaxed);
    }

    fn record_duration(&self, duration: Duration) {
        let millis = duration.as_millis().min(u64::MAX as u128) as u64;
        let slot = self.next_sample_slot.fetch_add(1, Ordering::Relaxed) as usize;

        if let Ok(mut samples) = self.job_duration_samples.write() {
            if samples.len() < MAX_DURATION_SAMPLES {
                samples.push(millis);
            } else {
                samples[slot % MAX_DURATION_SAMPLES] = millis;
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let (p50, p95) = match self.job_duration_samples.read() {
            Ok(samples) if !samples.is_empty() => {
                let mut sorted = samples.clone();
                sorted.sort_unstable();
                (
                    Some(percentile(&sorted, 50)),
                    Some(percentile(&sorted, 95)),
                )
            }
            _ => (None, None),
        };

        MetricsSnapshot {
            jobs_succeeded: self.jobs_succeeded.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            sync_attempts: self.sync_attempts.load(Ordering::Relaxed),
            sync_deferred: self.sync_deferred.load(Ordering::Relaxed),
            sync_blocked: self.sync_blocked.load(Ordering::Relaxed),
            job_duration_p50_ms: p50,
            job_duration_p95_ms: p95,
        }
    }
}

/// Nearest-rank percentile over a sorted slice.
fn percentile(sorted: &[u64], pct: usize) -> u64 {
    let rank = (pct * sorted.len()).div_ceil(100).max(1);
    sorted[rank - 1]
}
