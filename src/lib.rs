//! Collapser metrics: a Prometheus publisher for request collapsers.
//!
//! A collapser merges many near-simultaneous small requests into fewer batched
//! calls. This crate exports a collapser's runtime metrics into a pull-based
//! Prometheus registry: cumulative and rolling event counts, batch/shard size
//! distributions, and (optionally) live configuration values, one labeled
//! series per named collapser instance.
//!
//! Registration happens exactly once; every gauge is bound to a read closure
//! that pulls the current value from the metrics source at scrape time, so
//! nothing is cached or recomputed eagerly.
//!
//! # Modules
//!
//! - [`collector`]: Registry adapter with the lazy `add_gauge` contract
//! - [`error`]: Registration and publisher error types
//! - [`publisher`]: Per-collapser gauge catalog registration
//! - [`source`]: Metrics and configuration collaborator contracts

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // collector::MetricsCollector is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::cast_precision_loss      // Counts fit f64 gauges at scrape scale
)]

pub mod collector;
pub mod error;
pub mod publisher;
pub mod source;

pub use collector::MetricsCollector;
pub use error::{CollectorError, PublisherError};
pub use publisher::CollapserMetricsPublisher;
pub use source::{
    AtomicCollapserProperties, CollapserEvent, CollapserMetrics, CollapserProperties,
};

/// Label key identifying the collapser instance on every exported series.
pub const COLLAPSER_NAME_LABEL: &str = "collapser_name";

/// Fixed subsystem identifier for the collapser metric family.
pub const COLLAPSER_SUBSYSTEM: &str = "collapser";
