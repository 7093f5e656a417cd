//! Registry adapter exposing the lazy `add_gauge` contract.
//!
//! Gauges registered here carry no stored value: each wraps a read closure
//! that is invoked when the registry gathers, so a scrape always observes the
//! source's current state. Registration is the only mutation; gathering is a
//! side-effect-free read.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};
use std::collections::HashMap;

use crate::error::CollectorError;

/// Zero-argument read function evaluated at scrape time.
pub type ReadFn = Box<dyn Fn() -> f64 + Send + Sync>;

/// A gauge whose value is produced by a closure on every gather.
///
/// The wrapped [`Gauge`] carries the metric identity (name, help, const
/// labels); `collect` refreshes it from the closure before reporting, which
/// is what makes registration-time values irrelevant.
struct CallbackGauge {
    gauge: Gauge,
    read: ReadFn,
}

impl Collector for CallbackGauge {
    fn desc(&self) -> Vec<&Desc> {
        self.gauge.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.gauge.set((self.read)());
        self.gauge.collect()
    }
}

/// Wrapper around a Prometheus [`Registry`] with lazily-evaluated gauges.
///
/// Publishers call [`add_gauge`](Self::add_gauge) once per metric during
/// initialization; the host embeds [`registry`](Self::registry) in its scrape
/// endpoint. The collector itself owns no transport.
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Registry,
    namespace: Option<String>,
}

impl MetricsCollector {
    /// Create a collector backed by the given registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            namespace: None,
        }
    }

    /// Prefix every registered metric with a namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The wrapped registry, for embedding in a scrape endpoint.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a gauge bound to a read function.
    ///
    /// The function is not called here; it runs on every gather, on whatever
    /// thread serves the scrape. Duplicate metric identity surfaces as the
    /// registry's registration error.
    ///
    /// # Arguments
    ///
    /// * `subsystem` - Metric family identifier, joined into the full name
    /// * `name` - Metric name, unique within subsystem and label set
    /// * `help` - Documentation string served to scrapers
    /// * `labels` - Constant labels attached to every sample
    /// * `read` - Zero-argument closure producing the current value
    pub fn add_gauge(
        &self,
        subsystem: &str,
        name: &str,
        help: &str,
        labels: &HashMap<String, String>,
        read: impl Fn() -> f64 + Send + Sync + 'static,
    ) -> Result<(), CollectorError> {
        let mut opts = Opts::new(name, help)
            .subsystem(subsystem)
            .const_labels(labels.clone());
        if let Some(ns) = &self.namespace {
            opts = opts.namespace(ns.clone());
        }

        let gauge = CallbackGauge {
            gauge: Gauge::with_opts(opts)?,
            read: Box::new(read),
        };
        self.registry.register(Box::new(gauge))?;

        tracing::debug!(subsystem, metric = name, "registered gauge");
        Ok(())
    }

    /// Gather all registered metrics in the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(Registry::new())
    }
}
