//! Loader Metrics
//!
//! Counters for monitoring how level data is loaded and looked up.
//!
//! Uses atomic counters so a shared database can record from any task.
//! Each [`crate::loader::LevelDatabase`] owns its own instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Metrics collector for one level database
#[derive(Debug)]
pub struct LoaderMetrics {
    /// Bulk loads started (at most one per database)
    pub bulk_loads_total: AtomicU64,
    /// Bulk loads that produced no usable data
    pub bulk_loads_failed: AtomicU64,
    /// Levels placed in the cache
    pub levels_cached: AtomicU64,
    /// Level records skipped during construction
    pub levels_rejected: AtomicU64,
    /// Lookups served
    pub lookups_total: AtomicU64,
    /// Lookups answered with a level
    pub cache_hits: AtomicU64,
    /// Lookups answered with "not found"
    pub not_found: AtomicU64,
    /// Container bytes read from the source
    pub bytes_read: AtomicU64,
    /// Containers rejected by framing or authentication checks
    pub integrity_failures: AtomicU64,
    start_time: Instant,
}

impl LoaderMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            bulk_loads_total: AtomicU64::new(0),
            bulk_loads_failed: AtomicU64::new(0),
            levels_cached: AtomicU64::new(0),
            levels_rejected: AtomicU64::new(0),
            lookups_total: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            integrity_failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn bulk_load_started(&self) {
        self.bulk_loads_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bulk_load_failed(&self) {
        self.bulk_loads_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn levels_cached(&self, count: u64) {
        self.levels_cached.fetch_add(count, Ordering::Relaxed);
    }

    pub fn level_rejected(&self) {
        self.levels_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup and whether it found a level
    pub fn lookup(&self, found: bool) {
        self.lookups_total.fetch_add(1, Ordering::Relaxed);
        if found {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.not_found.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn bytes_read(&self, count: u64) {
        self.bytes_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn integrity_failure(&self) {
        self.integrity_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bulk_loads_total: self.bulk_loads_total.load(Ordering::Relaxed),
            bulk_loads_failed: self.bulk_loads_failed.load(Ordering::Relaxed),
            levels_cached: self.levels_cached.load(Ordering::Relaxed),
            levels_rejected: self.levels_rejected.load(Ordering::Relaxed),
            lookups_total: self.lookups_total.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            integrity_failures: self.integrity_failures.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            bulk_loads_total = snapshot.bulk_loads_total,
            bulk_loads_failed = snapshot.bulk_loads_failed,
            levels_cached = snapshot.levels_cached,
            levels_rejected = snapshot.levels_rejected,
            lookups_total = snapshot.lookups_total,
            cache_hits = snapshot.cache_hits,
            not_found = snapshot.not_found,
            bytes_read = snapshot.bytes_read,
            integrity_failures = snapshot.integrity_failures,
            uptime_seconds = snapshot.uptime_seconds,
            "Level loader metrics snapshot"
        );
    }
}

impl Default for LoaderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub bulk_loads_total: u64,
    pub bulk_loads_failed: u64,
    pub levels_cached: u64,
    pub levels_rejected: u64,
    pub lookups_total: u64,
    pub cache_hits: u64,
    pub not_found: u64,
    pub bytes_read: u64,
    pub integrity_failures: u64,
    pub uptime_seconds: u64,
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_ms = crate::utils::timeout::saturating_millis(duration),
            "Operation completed"
        );
    }
}
