//! # Stoa Docs
//!
//! Describes routed handlers for API documentation.
//!
//! Each [`Route`] inspects its handler's parameters once, at construction,
//! and builds a [`Link`]: which inputs come from the path, the query string
//! or the body, which of them are required, the request encoding and the
//! documented response. [`Include`] groups routes under a URL prefix, and
//! [`build_document`] assembles the whole table into a [`Document`].
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use stoa_core::{Function, TypeSchema, Validator, Value};
//! use stoa_docs::{build_document, Include, Location, Route};
//!
//! let pet = TypeSchema::new("Pet", [("name", Validator::string())]);
//! let create = Function::builder("create_pet")
//!     .param("pet", pet)
//!     .doc("Add a pet.")
//!     .sync(|_| Ok(Value::none()));
//!
//! let route = Route::new("/", Method::POST, create).unwrap();
//! assert_eq!(route.encoding(), Some("application/json"));
//!
//! let doc = build_document(&[Include::new("/pets", "pets", vec![route.into()]).into()]);
//! let link = doc.link("create_pet").unwrap();
//! assert_eq!(link.url, "/pets/");
//! assert_eq!(link.fields[0].location, Location::Body);
//! ```

#![doc(html_root_url = "https://docs.rs/stoa-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod document;
mod error;
mod route;

pub use document::{Content, Document, Field, Link, Location, Response, Section};
pub use error::{DocsError, DocsResult};
pub use route::{
    build_document, build_section, path_names, Include, ParameterKind, Route, RouteBuilder,
    RouteItem,
};
