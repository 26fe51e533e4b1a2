//! Typed configuration for Stoa applications.
//!
//! Configuration is layered: built-in defaults, then a TOML or JSON file,
//! then environment variables. Unknown fields are rejected at every level.
//!
//! # Example
//!
//! ```no_run
//! use stoa_config::ConfigLoader;
//!
//! # fn main() -> Result<(), stoa_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("stoa.toml")?
//!     .with_env_prefix("STOA")
//!     .load()?;
//!
//! println!("starting {}", config.app.name);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [app]
//! name = "pets"
//! async_mode = true
//! warm_plans = true
//!
//! [docs]
//! enabled = true
//! title = "Pet Store"
//! version = "1.0.0"
//! url = "/docs/"
//!
//! [logging]
//! enabled = true
//! level = "info,stoa_inject=debug"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every value can be overridden with `PREFIX__SECTION__KEY`, for example
//! `STOA__APP__ASYNC_MODE=true` or `STOA__LOGGING__FORMAT=pretty`.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::StoaConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{AppConfig, DocsConfig, LogFormat, LoggingConfig};
