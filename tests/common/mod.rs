//! Test utilities for the publisher integration suite.
//!
//! Provides:
//! - A fake collapser metrics source with settable counters
//! - Recording of percentile arguments as delivered by gauge reads
//! - Helpers for locating gathered series by name

use collapser_metrics::{CollapserEvent, CollapserMetrics};
use prometheus::proto::MetricFamily;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Fake metrics source with externally settable state.
///
/// Counters are atomics so tests can bump them between scrapes; percentile
/// calls are recorded so tests can assert the exact arguments the gauges
/// deliver.
#[derive(Default)]
pub struct FakeCollapserMetrics {
    cumulative: [AtomicU64; 3],
    rolling: [AtomicU64; 3],
    pub batch_size_mean: Mutex<f64>,
    pub shard_size_mean: Mutex<f64>,
    pub batch_percentile_calls: Mutex<Vec<f64>>,
    pub shard_percentile_calls: Mutex<Vec<f64>>,
}

fn slot(event: CollapserEvent) -> usize {
    match event {
        CollapserEvent::RequestBatched => 0,
        CollapserEvent::BatchExecuted => 1,
        CollapserEvent::ResponseFromCache => 2,
    }
}

impl FakeCollapserMetrics {
    pub fn set_cumulative(&self, event: CollapserEvent, value: u64) {
        self.cumulative[slot(event)].store(value, Ordering::Relaxed);
    }

    pub fn set_rolling(&self, event: CollapserEvent, value: u64) {
        self.rolling[slot(event)].store(value, Ordering::Relaxed);
    }
}

impl CollapserMetrics for FakeCollapserMetrics {
    fn cumulative_count(&self, event: CollapserEvent) -> u64 {
        self.cumulative[slot(event)].load(Ordering::Relaxed)
    }

    fn rolling_count(&self, event: CollapserEvent) -> u64 {
        self.rolling[slot(event)].load(Ordering::Relaxed)
    }

    fn batch_size_mean(&self) -> f64 {
        *self.batch_size_mean.lock().expect("mean lock poisoned")
    }

    fn batch_size_percentile(&self, percentile: f64) -> f64 {
        self.batch_percentile_calls
            .lock()
            .expect("recorder lock poisoned")
            .push(percentile);
        percentile
    }

    fn shard_size_mean(&self) -> f64 {
        *self.shard_size_mean.lock().expect("mean lock poisoned")
    }

    fn shard_size_percentile(&self, percentile: f64) -> f64 {
        self.shard_percentile_calls
            .lock()
            .expect("recorder lock poisoned")
            .push(percentile);
        percentile
    }
}

/// Find a gathered family by full metric name.
pub fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
    families
        .iter()
        .find(|f| f.get_name() == name)
        .unwrap_or_else(|| panic!("metric family {name} not found"))
}

/// Current gauge value of the single sample in the named family.
pub fn gauge_value(families: &[MetricFamily], name: &str) -> f64 {
    let f = family(families, name);
    assert_eq!(f.get_metric().len(), 1, "expected one sample for {name}");
    f.get_metric()[0].get_gauge().get_value()
}
