//! Configuration validation.

use std::fmt;

use crate::error::ConfigError;
use crate::schema::{Config, LOG_FORMATS, LOG_LEVELS};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_agent(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    /// Validate, turning the first error into a [`ConfigError::InvalidValue`].
    /// Warnings are returned for the caller to report.
    pub fn ensure_valid(config: &Config) -> Result<Vec<ValidationWarning>, ConfigError> {
        let result = Self::validate(config)?;
        match result.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(result.warnings),
        }
    }

    fn validate_agent(config: &Config, result: &mut ValidationResult) {
        let agent = &config.agent;

        if agent.default_max_turns == 0 {
            result.add_error(ValidationError::new(
                "agent.default_max_turns",
                "default_max_turns must be greater than 0",
            ));
        }

        if agent.default_max_turns > 1000 {
            result.add_warning(ValidationWarning::new(
                "agent.default_max_turns",
                "default_max_turns is very high (>1000), sub-agents may run for a long time",
            ));
        }

        if agent.default_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "agent.default_timeout_ms",
                "default_timeout_ms must be greater than 0",
            ));
        }

        if agent.preview_chars == 0 {
            result.add_error(ValidationError::new(
                "agent.preview_chars",
                "preview_chars must be greater than 0",
            ));
        }

        if agent.default_timeout_ms > 0 && agent.warning_lead_ms >= agent.default_timeout_ms {
            result.add_warning(ValidationWarning::new(
                "agent.warning_lead_ms",
                "warning_lead_ms is not below default_timeout_ms, the time warning will be sent on the first turn",
            ));
        }

        if let Some(ref instructions) = agent.system_instructions {
            if instructions.trim().is_empty() {
                result.add_warning(ValidationWarning::new(
                    "agent.system_instructions",
                    "system_instructions is empty, sub-agents will get no system prompt",
                ));
            }
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let logging = &config.logging;

        if !LOG_FORMATS.contains(&logging.format.as_str()) {
            result.add_error(ValidationError::new(
                "logging.format",
                format!(
                    "Unknown log format '{}', valid values: {:?}",
                    logging.format, LOG_FORMATS
                ),
            ));
        }

        // Directives such as `delegate_runtime=debug` are passed through to the filter.
        let is_directive = logging.level.contains('=') || logging.level.contains(',');
        if !is_directive && !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            result.add_error(ValidationError::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    logging.level, LOG_LEVELS
                ),
            ));
        }

        if let Some(ref dir) = logging.directory {
            if dir.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "logging.directory",
                    "directory cannot be empty, omit it to log to the console only",
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
