//! Structured logging for Stoa applications.
//!
//! The Stoa crates emit [`tracing`] events: plan construction at `debug`,
//! every executed step at `trace`, configuration failures at `warn` and
//! request outcomes from the application facade. This crate installs a
//! subscriber that writes those events as JSON lines or as human-readable
//! text.
//!
//! # Example
//!
//! ```rust,no_run
//! use stoa_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).expect("logging");
//! tracing::info!(route = "get_user", "serving");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
