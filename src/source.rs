//! Collaborator contracts: the live metrics source and configuration source.
//!
//! Both are owned by the collapsing mechanism and read-only from this crate's
//! perspective. Implementations must be safe for concurrent reads: closures
//! registered by the publisher call these accessors from whatever thread(s)
//! serve a scrape, possibly while the collapser is updating its counters.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Event kinds counted by a collapser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollapserEvent {
    /// A request was absorbed into a pending batch.
    RequestBatched,
    /// A batch was executed against the downstream.
    BatchExecuted,
    /// A response was served from the request cache instead of a batch.
    ResponseFromCache,
}

impl CollapserEvent {
    /// Stable name for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            CollapserEvent::RequestBatched => "request_batched",
            CollapserEvent::BatchExecuted => "batch_executed",
            CollapserEvent::ResponseFromCache => "response_from_cache",
        }
    }
}

/// Read-only view of a collapser's live statistics.
///
/// Cumulative counts are totals since process start; rolling counts cover the
/// most recent statistical window. Percentile arguments are percentages in
/// the 0-100 range, fractional allowed (99.5 is passed as 99.5, never
/// rounded). All statistics are computed by the implementor; this crate only
/// reads them on demand.
pub trait CollapserMetrics: Send + Sync {
    /// Total occurrences of `event` since process start.
    fn cumulative_count(&self, event: CollapserEvent) -> u64;

    /// Occurrences of `event` within the rolling statistical window.
    fn rolling_count(&self, event: CollapserEvent) -> u64;

    /// Mean of the batch size distribution.
    fn batch_size_mean(&self) -> f64;

    /// Batch size at the given percentile (0-100, fractional allowed).
    fn batch_size_percentile(&self, percentile: f64) -> f64;

    /// Mean of the shard size distribution.
    fn shard_size_mean(&self) -> f64;

    /// Shard size at the given percentile (0-100, fractional allowed).
    fn shard_size_percentile(&self, percentile: f64) -> f64;
}

/// Read-only view of a collapser's configuration.
///
/// Values may change at runtime (dynamic property reload); accessors return
/// the current value on every call.
pub trait CollapserProperties: Send + Sync {
    /// Length of the rolling statistical window in milliseconds.
    fn rolling_statistical_window_ms(&self) -> u64;

    /// Whether request-level caching is enabled.
    fn request_cache_enabled(&self) -> bool;

    /// Maximum number of requests allowed in a single batch.
    fn max_requests_in_batch(&self) -> u64;

    /// Timer delay between batch executions in milliseconds.
    fn timer_delay_ms(&self) -> u64;
}

/// Live-reloadable [`CollapserProperties`] backed by atomics.
///
/// Setters take `&self`, so a configuration watcher can flip values while
/// scrapes read them concurrently. Property gauges observe the new value on
/// the next scrape.
#[derive(Debug)]
pub struct AtomicCollapserProperties {
    rolling_statistical_window_ms: AtomicU64,
    request_cache_enabled: AtomicBool,
    max_requests_in_batch: AtomicU64,
    timer_delay_ms: AtomicU64,
}

impl AtomicCollapserProperties {
    /// Create properties with the given initial values.
    pub fn new(
        rolling_statistical_window_ms: u64,
        request_cache_enabled: bool,
        max_requests_in_batch: u64,
        timer_delay_ms: u64,
    ) -> Self {
        Self {
            rolling_statistical_window_ms: AtomicU64::new(rolling_statistical_window_ms),
            request_cache_enabled: AtomicBool::new(request_cache_enabled),
            max_requests_in_batch: AtomicU64::new(max_requests_in_batch),
            timer_delay_ms: AtomicU64::new(timer_delay_ms),
        }
    }

    /// Update the rolling statistical window length.
    pub fn set_rolling_statistical_window_ms(&self, value: u64) {
        self.rolling_statistical_window_ms
            .store(value, Ordering::Relaxed);
    }

    /// Enable or disable request-level caching.
    pub fn set_request_cache_enabled(&self, value: bool) {
        self.request_cache_enabled.store(value, Ordering::Relaxed);
    }

    /// Update the per-batch request limit.
    pub fn set_max_requests_in_batch(&self, value: u64) {
        self.max_requests_in_batch.store(value, Ordering::Relaxed);
    }

    /// Update the batch timer delay.
    pub fn set_timer_delay_ms(&self, value: u64) {
        self.timer_delay_ms.store(value, Ordering::Relaxed);
    }
}

impl Default for AtomicCollapserProperties {
    /// Defaults matching a typical collapser: 10s window, caching on,
    /// unbounded batches, 10ms timer.
    fn default() -> Self {
        Self::new(10_000, true, u64::MAX, 10)
    }
}

impl CollapserProperties for AtomicCollapserProperties {
    fn rolling_statistical_window_ms(&self) -> u64 {
        self.rolling_statistical_window_ms.load(Ordering::Relaxed)
    }

    fn request_cache_enabled(&self) -> bool {
        self.request_cache_enabled.load(Ordering::Relaxed)
    }

    fn max_requests_in_batch(&self) -> u64 {
        self.max_requests_in_batch.load(Ordering::Relaxed)
    }

    fn timer_delay_ms(&self) -> u64 {
        self.timer_delay_ms.load(Ordering::Relaxed)
    }
}
