//! Metrics collection and reporting

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics collector for the mood pipeline.
///
/// Every increment is kept locally for snapshots and forwarded to the
/// `metrics` facade, so an installed exporter sees the same numbers.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    computations: AtomicU64,
    local_batches: AtomicU64,
    remote_batches: AtomicU64,
    degraded_batches: AtomicU64,
    scopes_processed: AtomicU64,
    scopes_failed: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Record a fresh cache entry served without recomputation
    pub fn record_cache_hit(&self) {
        self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("moodscope_cache_total", "outcome" => "hit").increment(1);
    }

    /// Record a missing or stale cache entry
    pub fn record_cache_miss(&self) {
        self.inner.cache_misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("moodscope_cache_total", "outcome" => "miss").increment(1);
    }

    /// Record a completed mood computation
    pub fn record_computation(&self) {
        self.inner.computations.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("moodscope_computations_total").increment(1);
    }

    /// Record a batch labelled by the on-box pipeline
    pub fn record_local_batch(&self) {
        self.inner.local_batches.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("moodscope_classifier_batches_total", "tier" => "local").increment(1);
    }

    /// Record a batch sent to the remote inference service
    pub fn record_remote_batch(&self) {
        self.inner.remote_batches.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("moodscope_classifier_batches_total", "tier" => "remote").increment(1);
    }

    /// Record a remote batch that degraded to neutral labels
    pub fn record_degraded_batch(&self, reason: &'static str) {
        self.inner.degraded_batches.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("moodscope_degraded_batches_total", "reason" => reason).increment(1);
    }

    /// Record the outcome of one scope in a batch run
    pub fn record_scope_outcome(&self, success: bool) {
        if success {
            self.inner.scopes_processed.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("moodscope_batch_scopes_total", "outcome" => "processed")
                .increment(1);
        } else {
            self.inner.scopes_failed.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("moodscope_batch_scopes_total", "outcome" => "failed").increment(1);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.inner.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.inner.cache_misses.load(Ordering::Relaxed),
            computations: self.inner.computations.load(Ordering::Relaxed),
            local_batches: self.inner.local_batches.load(Ordering::Relaxed),
            remote_batches: self.inner.remote_batches.load(Ordering::Relaxed),
            degraded_batches: self.inner.degraded_batches.load(Ordering::Relaxed),
            scopes_processed: self.inner.scopes_processed.load(Ordering::Relaxed),
            scopes_failed: self.inner.scopes_failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub computations: u64,
    pub local_batches: u64,
    pub remote_batches: u64,
    pub degraded_batches: u64,
    pub scopes_processed: u64,
    pub scopes_failed: u64,
}

impl MetricsSnapshot {
    /// Fraction of cache lookups served from a fresh entry
    pub fn cache_hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }

    /// Fraction of remote batches that degraded to neutral
    pub fn degraded_rate(&self) -> f64 {
        if self.remote_batches == 0 {
            0.0
        } else {
            self.degraded_batches as f64 / self.remote_batches as f64
        }
    }
}
