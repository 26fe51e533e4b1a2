//! Configuration sections.

use serde::{Deserialize, Serialize};
use stoa_telemetry::LogConfig;

fn default_true() -> bool {
    true
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application name, used as the logging service name.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Run handlers on the async injector.
    #[serde(default)]
    pub async_mode: bool,

    /// Build every route's execution plan at startup, so wiring errors
    /// surface before the first request.
    #[serde(default = "default_true")]
    pub warm_plans: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            async_mode: false,
            warm_plans: true,
        }
    }
}

fn default_app_name() -> String {
    "stoa-app".to_string()
}

/// API document settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    /// Serve the API document.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Document title.
    #[serde(default)]
    pub title: String,

    /// API version.
    #[serde(default)]
    pub version: String,

    /// Document description (Markdown).
    #[serde(default)]
    pub description: String,

    /// Path the document is served at.
    #[serde(default = "default_docs_url")]
    pub url: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: String::new(),
            version: String::new(),
            description: String::new(),
            url: default_docs_url(),
        }
    }
}

fn default_docs_url() -> String {
    "/docs/".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable text.
    Pretty,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// Converts to the subscriber settings for `service_name`.
    ///
    /// Pretty output also turns on span events and source locations.
    pub fn to_log_config(&self, service_name: &str) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            ..base
        }
        .with_level(self.level.clone())
        .with_service_name(service_name)
    }
}
