//! # Stoa
//!
//! **Dependency-injected HTTP handlers with generated API documentation.**
//!
//! Handlers declare what they need as typed parameters. Stoa works out how to
//! produce every value from the inbound request, caches that plan per
//! handler, and describes each route as a documented link:
//!
//! - **Injection** – components resolve parameters, recursively, into a cached plan
//! - **Validation** – path, query and body values are coerced by typed validators
//! - **Documentation** – fields, encodings and responses are inferred from signatures
//! - **Sync or async** – one plan, run on a blocking or a suspending executor
//!
//! ## Quick Start
//!
//! ```rust
//! use stoa::prelude::*;
//!
//! let get_item = Function::builder("get_item")
//!     .param("id", Scalar::Int)
//!     .param("verbose", Validator::boolean().with_default(false))
//!     .doc("Fetch a single *item*.")
//!     .sync(|args| {
//!         let id = args.json("id")?.clone();
//!         Ok(Value::json(serde_json::json!({ "id": id })))
//!     });
//!
//! let app = App::builder()
//!     .route(Route::new("/items/{id}", Method::GET, get_item).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let response = app.handle(Request::new(Method::GET, "/items/4".parse().unwrap()));
//! assert_eq!(response.status(), http::StatusCode::OK);
//!
//! let link = app.document().link("get_item").unwrap();
//! assert_eq!(link.fields.len(), 2);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Router → State { request, path_params }
//!                        ↓
//!        Injector plan [on_request.., handler] → on_response.. → Response
//!                        ↓ (error)
//!                 Response::from_error → on_error..
//! ```

#![doc(html_root_url = "https://docs.rs/stoa/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod error;
mod response;
pub mod router;

pub use app::{App, AppBuilder, Application, AsyncApp, Hooks};
pub use error::{AppError, AppResult};
pub use response::Response;

// Re-export core types
pub use stoa_core as core;

// Re-export the injector
pub use stoa_inject as inject;

// Re-export request values and built-in components
pub use stoa_extract as extract;

// Re-export route descriptions
pub use stoa_docs as docs;

// Re-export logging setup
pub use stoa_telemetry as telemetry;

// Re-export configuration
pub use stoa_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use stoa::prelude::*;
///
/// let handler = Function::builder("ping").sync(|_| Ok(Value::json("pong")));
/// let route = Route::new("/ping", Method::GET, handler).unwrap();
/// assert_eq!(route.name(), "ping");
/// ```
pub mod prelude {
    pub use crate::{App, AppBuilder, Application, AsyncApp, Response};

    pub use stoa_config::{ConfigLoader, StoaConfig};
    pub use stoa_core::{
        Annotation, Args, ConfigurationError, Error, Function, Scalar, TypeSchema, Validator,
        Value,
    };
    pub use stoa_docs::{Document, Include, Route, RouteItem};
    pub use stoa_extract::Request;
    pub use stoa_inject::{Component, FnComponent};

    pub use http::Method;
}
