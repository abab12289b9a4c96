//! Configuration validation

use super::SetupConfig;
use crate::protocol::InterfaceName;
use crate::telemetry::is_known_level;
use tracing::{error, warn};

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Emits every diagnostic as a tracing event.
    pub fn log_diagnostics(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
        for err in &self.errors {
            error!("{}", err);
        }
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &SetupConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    match &config.interface {
        Some(name) => {
            if let Err(e) = InterfaceName::new(name.as_str()) {
                result.error(format!("interface: {}", e));
            }
        }
        None => result.warn("interface: not specified, callers must name one"),
    }

    if config.connect_timeout_ms == Some(0) {
        result.warn("connect_timeout_ms: 0 disables the timeout");
    }

    if !is_known_level(&config.logging.level) {
        result.warn(format!(
            "logging.level: unknown level {:?}, using info",
            config.logging.level
        ));
    }

    result
}
