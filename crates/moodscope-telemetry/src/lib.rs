//! MoodScope Telemetry
//!
//! Counters for the insights pipeline: cache effectiveness, which
//! classification tier served each batch, how often the remote tier
//! degraded, and batch run outcomes.

pub mod metrics;

pub use metrics::{MetricsCollector, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
}
