//! Prometheus metrics and structured logging for the StandX maker bot.
//!
//! - Tick/order/flatten counters exposed as Prometheus metrics
//! - Structured JSON logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
