//! Observability for Daedalus.
//!
//! - **Logging**: `tracing-subscriber` with JSON or pretty output
//! - **Metrics**: dispatch counters and latency through the `metrics` facade
//!
//! # Example
//!
//! ```rust,ignore
//! use daedalus_telemetry::{init_logging, metrics, LogConfig};
//!
//! init_logging(&LogConfig::default())?;
//! metrics::describe_metrics();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat, LogWriter};
pub use metrics::{record_dispatch, InFlightGuard};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
