//! Per-collapser gauge catalog registration.
//!
//! One publisher exists per named collapser instance. `initialize` registers
//! the fixed catalog exactly once: cumulative and rolling event counts, batch
//! and shard size distribution gauges, and optionally the live configuration
//! values. Every gauge delegates to the metrics or configuration source at
//! scrape time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::collector::MetricsCollector;
use crate::error::{CollectorError, PublisherError};
use crate::source::{CollapserEvent, CollapserMetrics, CollapserProperties};
use crate::{COLLAPSER_NAME_LABEL, COLLAPSER_SUBSYSTEM};

/// Percentile points exported for both size distributions.
///
/// The suffix is the percentile with the decimal point dropped (995 = 99.5),
/// kept verbatim for dashboard compatibility.
const PERCENTILES: [(&str, f64); 6] = [
    ("25", 25.0),
    ("50", 50.0),
    ("75", 75.0),
    ("90", 90.0),
    ("99", 99.0),
    ("995", 99.5),
];

const CUMULATIVE_DOC: &str = "These are cumulative counts since the start of the application.";
const ROLLING_DOC: &str = "These are \"point in time\" counts representing the last X seconds.";
const BATCH_SIZE_DOC: &str = "Collapser batch size metric.";
const SHARD_SIZE_DOC: &str = "Collapser shard size metric.";
const PROPERTY_DOC: &str = "Configuration property partitioned by collapser_name.";

/// Registers the gauge catalog for one named collapser instance.
///
/// Holds no mutable state beyond the initialization latch; after
/// [`initialize`](Self::initialize) the registry owns the gauges and the
/// publisher can be dropped.
pub struct CollapserMetricsPublisher {
    collector: MetricsCollector,
    name: String,
    labels: HashMap<String, String>,
    metrics: Arc<dyn CollapserMetrics>,
    properties: Arc<dyn CollapserProperties>,
    export_properties: bool,
    initialized: AtomicBool,
}

impl CollapserMetricsPublisher {
    /// Create a publisher for the collapser named `name`.
    ///
    /// Builds the `collapser_name` label set; performs no registry calls.
    ///
    /// # Arguments
    ///
    /// * `collector` - Registry adapter the gauges are registered against
    /// * `name` - Unique collapser instance name, becomes the label value
    /// * `metrics` - Live statistics source, read at scrape time
    /// * `properties` - Live configuration source, read at scrape time
    /// * `export_properties` - Whether to also export configuration gauges
    pub fn new(
        collector: MetricsCollector,
        name: impl Into<String>,
        metrics: Arc<dyn CollapserMetrics>,
        properties: Arc<dyn CollapserProperties>,
        export_properties: bool,
    ) -> Self {
        let name = name.into();
        let labels = HashMap::from([(COLLAPSER_NAME_LABEL.to_string(), name.clone())]);
        Self {
            collector,
            name,
            labels,
            metrics,
            properties,
            export_properties,
            initialized: AtomicBool::new(false),
        }
    }

    /// Register the gauge catalog: 20 gauges, 24 with property export.
    ///
    /// Values are never computed here; each gauge is bound to a closure over
    /// the source and evaluated on every scrape.
    ///
    /// # Errors
    ///
    /// Fails fast with [`PublisherError::AlreadyInitialized`] on a second
    /// call. Registry rejections (duplicate or invalid metric identity)
    /// propagate as [`PublisherError::Collector`].
    pub fn initialize(&self) -> Result<(), PublisherError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(PublisherError::AlreadyInitialized(self.name.clone()));
        }

        self.register_cumulative_count("count_requests_batched", CollapserEvent::RequestBatched)?;
        self.register_cumulative_count("count_batches", CollapserEvent::BatchExecuted)?;
        self.register_cumulative_count(
            "count_responses_from_cache",
            CollapserEvent::ResponseFromCache,
        )?;

        // The cache-rolling name is historically irregular; consumers key on it.
        self.register_rolling_count("rolling_requests_batched", CollapserEvent::RequestBatched)?;
        self.register_rolling_count("rolling_batches", CollapserEvent::BatchExecuted)?;
        self.register_rolling_count(
            "rolling_count_responses_from_cache",
            CollapserEvent::ResponseFromCache,
        )?;

        let metrics = Arc::clone(&self.metrics);
        self.add_gauge("batch_size_mean", BATCH_SIZE_DOC, move || {
            metrics.batch_size_mean()
        })?;
        for (suffix, percentile) in PERCENTILES {
            self.register_batch_size_percentile(suffix, percentile)?;
        }

        let metrics = Arc::clone(&self.metrics);
        self.add_gauge("shard_size_mean", SHARD_SIZE_DOC, move || {
            metrics.shard_size_mean()
        })?;
        for (suffix, percentile) in PERCENTILES {
            self.register_shard_size_percentile(suffix, percentile)?;
        }

        if self.export_properties {
            self.register_integer_property(
                "property_value_rolling_statistical_window_in_milliseconds",
                |p| p.rolling_statistical_window_ms(),
            )?;
            self.register_boolean_property("property_value_request_cache_enabled", |p| {
                p.request_cache_enabled()
            })?;
            self.register_integer_property("property_value_max_requests_in_batch", |p| {
                p.max_requests_in_batch()
            })?;
            self.register_integer_property("property_value_timer_delay_in_milliseconds", |p| {
                p.timer_delay_ms()
            })?;
        }

        tracing::debug!(
            collapser = %self.name,
            export_properties = self.export_properties,
            "collapser gauges registered"
        );
        Ok(())
    }

    fn add_gauge(
        &self,
        name: &str,
        doc: &str,
        read: impl Fn() -> f64 + Send + Sync + 'static,
    ) -> Result<(), CollectorError> {
        self.collector
            .add_gauge(COLLAPSER_SUBSYSTEM, name, doc, &self.labels, read)
    }

    fn register_cumulative_count(
        &self,
        name: &str,
        event: CollapserEvent,
    ) -> Result<(), CollectorError> {
        tracing::debug!(metric = name, event = event.as_str(), "binding cumulative count gauge");
        let metrics = Arc::clone(&self.metrics);
        self.add_gauge(name, CUMULATIVE_DOC, move || {
            metrics.cumulative_count(event) as f64
        })
    }

    fn register_rolling_count(
        &self,
        name: &str,
        event: CollapserEvent,
    ) -> Result<(), CollectorError> {
        tracing::debug!(metric = name, event = event.as_str(), "binding rolling count gauge");
        let metrics = Arc::clone(&self.metrics);
        self.add_gauge(name, ROLLING_DOC, move || {
            metrics.rolling_count(event) as f64
        })
    }

    fn register_batch_size_percentile(
        &self,
        suffix: &str,
        percentile: f64,
    ) -> Result<(), CollectorError> {
        let metrics = Arc::clone(&self.metrics);
        self.add_gauge(
            &format!("batch_size_percentile_{suffix}"),
            BATCH_SIZE_DOC,
            move || metrics.batch_size_percentile(percentile),
        )
    }

    fn register_shard_size_percentile(
        &self,
        suffix: &str,
        percentile: f64,
    ) -> Result<(), CollectorError> {
        let metrics = Arc::clone(&self.metrics);
        self.add_gauge(
            &format!("shard_size_percentile_{suffix}"),
            SHARD_SIZE_DOC,
            move || metrics.shard_size_percentile(percentile),
        )
    }

    fn register_integer_property(
        &self,
        name: &str,
        read: fn(&dyn CollapserProperties) -> u64,
    ) -> Result<(), CollectorError> {
        let properties = Arc::clone(&self.properties);
        self.add_gauge(name, PROPERTY_DOC, move || read(properties.as_ref()) as f64)
    }

    fn register_boolean_property(
        &self,
        name: &str,
        read: fn(&dyn CollapserProperties) -> bool,
    ) -> Result<(), CollectorError> {
        let properties = Arc::clone(&self.properties);
        self.add_gauge(name, PROPERTY_DOC, move || {
            if read(properties.as_ref()) {
                1.0
            } else {
                0.0
            }
        })
    }
}
