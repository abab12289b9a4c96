//! Telemetry module for logging and metrics.
//!
//! Provides:
//! - Logging configuration and initialization
//! - Traffic counters for discovery sockets

mod logging;
mod metrics;

pub use logging::{LogConfig, LogFormat, init_logging};
pub(crate) use logging::is_known_level;
pub use metrics::{Counter, SocketStats, StatsSnapshot};
