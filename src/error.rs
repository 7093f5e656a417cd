//! Error types for gauge registration and publisher lifecycle.

use thiserror::Error;

/// Error type for collector registration operations.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Failed to register gauge: {0}")]
    Registration(#[from] prometheus::Error),
}

/// Error type for publisher initialization.
#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("Publisher for collapser '{0}' is already initialized")]
    AlreadyInitialized(String),

    #[error("Gauge registration failed: {0}")]
    Collector(#[from] CollectorError),
}
