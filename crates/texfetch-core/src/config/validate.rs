//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.workers must be > 0".into(),
            ));
        }
        if self.transport.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "transport.timeout_ms must be > 0".into(),
            ));
        }
        if self.transport.pool_max_idle_per_host < self.processing.workers {
            return Err(ConfigError::ValidationError(format!(
                "transport.pool_max_idle_per_host ({}) must be >= processing.workers ({})",
                self.transport.pool_max_idle_per_host, self.processing.workers
            )));
        }
        if let Some(bad) = self
            .transport
            .retry_statuses
            .iter()
            .find(|s| !(100..=599).contains(*s))
        {
            return Err(ConfigError::ValidationError(format!(
                "transport.retry_statuses contains invalid status {bad}"
            )));
        }
        if !self.endpoints.cdn_url_template.contains("{id}") {
            return Err(ConfigError::ValidationError(
                "endpoints.cdn_url_template must contain {id}".into(),
            ));
        }
        if self.endpoints.convert_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "endpoints.convert_url must not be empty".into(),
            ));
        }
        if self.paths.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "paths.output_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}
