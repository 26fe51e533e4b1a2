//! # Stoa Core
//!
//! Core types shared by every crate of the Stoa framework.
//!
//! This crate provides the vocabulary the injector and the documentation
//! builder both speak:
//!
//! - [`Validator`] - Typed field descriptors that coerce and validate raw values
//! - [`TypeSchema`] - Structured request types (a named set of validated properties)
//! - [`Parameter`] / [`Annotation`] - The declared inputs of a handler function
//! - [`Function`] - A callable with a declared signature, sync or async
//! - [`Value`] / [`Args`] - Type-erased values flowing between resolution steps
//! - [`Error`] - Configuration, validation and handler errors
//!
//! ## Example
//!
//! ```rust
//! use stoa_core::{Annotation, Function, Scalar, Validator, Value};
//!
//! let handler = Function::builder("greet")
//!     .param("name", Scalar::Str)
//!     .param("excited", Validator::boolean().with_default(false))
//!     .returns(Validator::string())
//!     .sync(|args| {
//!         let name = args.json("name")?.as_str().unwrap_or_default().to_owned();
//!         Ok(Value::json(format!("Hello, {name}")))
//!     });
//!
//! assert_eq!(handler.parameters().len(), 2);
//! assert!(!handler.is_async());
//! ```

#![doc(html_root_url = "https://docs.rs/stoa-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod markdown;
pub mod params;
mod signature;
mod types;
mod validators;

pub use error::{ConfigurationError, Error, ErrorCategory, Result};
pub use markdown::{DocRenderer, MarkdownRenderer};
pub use params::{PathParams, QueryParams, QueryString};
pub use signature::{
    Annotation, Args, BoxFuture, Function, FunctionBuilder, FunctionId, Parameter, Scalar,
    TypeMarker, Value,
};
pub use types::TypeSchema;
pub use validators::{ValidationErrors, Validator, ValidatorKind};
