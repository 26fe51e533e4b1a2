//! The root configuration type.

use serde::{Deserialize, Serialize};
use stoa_telemetry::LogConfig;

use crate::{AppConfig, ConfigError, DocsConfig, LogFormat, LoggingConfig};

/// Complete Stoa application configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer a file and environment
/// variables over the defaults.
///
/// # Example
///
/// ```
/// use stoa_config::StoaConfig;
///
/// let config = StoaConfig::default();
/// assert_eq!(config.app.name, "stoa-app");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct StoaConfig {
    /// Application settings.
    #[serde(default)]
    pub app: AppConfig,

    /// API document settings.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StoaConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `app.name` is empty
    /// - `logging.level` is not a valid filter directive
    /// - `docs.url` does not start with `/` while docs are enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("app.name", "must not be empty"));
        }

        if self.logging.enabled {
            stoa_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        if self.docs.enabled && !self.docs.url.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "docs.url",
                format!("must start with '/': {}", self.docs.url),
            ));
        }

        Ok(())
    }

    /// Local development: pretty `debug` logs.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config
    }

    /// Production: JSON `info` logs, plans warmed at startup.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.app.warm_plans = true;
        config
    }

    /// Returns the subscriber settings, named after the application.
    pub fn log_config(&self) -> LogConfig {
        self.logging.to_log_config(&self.app.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(StoaConfig::development().logging.format, LogFormat::Pretty);
        assert_eq!(StoaConfig::production().logging.format, LogFormat::Json);
        assert!(StoaConfig::production().app.warm_plans);
    }

    #[test]
    fn test_validate_empty_name() {
        let mut config = StoaConfig::default();
        config.app.name = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "app.name"
        ));
    }

    #[test]
    fn test_validate_bad_level() {
        let mut config = StoaConfig::default();
        config.logging.level = "stoa=[".to_string();
        assert!(config.validate().is_err());

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_docs_url() {
        let mut config = StoaConfig::default();
        config.docs.url = "docs".to_string();
        assert!(config.validate().is_err());

        config.docs.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_config_uses_app_name() {
        let mut config = StoaConfig::development();
        config.app.name = "pets".to_string();
        let log = config.log_config();
        assert_eq!(log.service_name, "pets");
        assert_eq!(log.level, "debug");
        assert!(!log.json_format);
    }
}
