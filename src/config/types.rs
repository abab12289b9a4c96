//! Configuration types

use crate::telemetry::LogConfig;
use serde::Deserialize;
use std::time::Duration;

/// Setup configuration (TOML)
///
/// ```toml
/// interface = "eth0"
/// connect_timeout_ms = 3000
/// nonblocking_discovery = false
///
/// [logging]
/// level = "info"
/// format = "pretty"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupConfig {
    /// Interface the discovery socket is bound to
    #[serde(default)]
    pub interface: Option<String>,
    /// Upper bound for the session connect, applied as `SO_SNDTIMEO`
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    /// Put the discovery socket in O_NONBLOCK mode after setup
    #[serde(default)]
    pub nonblocking_discovery: bool,
    #[serde(default)]
    pub logging: LogConfig,
}

impl SetupConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }
}
