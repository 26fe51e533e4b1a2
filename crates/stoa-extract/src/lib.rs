//! # Stoa Extract
//!
//! Per-request values and the built-in component set.
//!
//! The transport seeds per-request state with two values, the inbound
//! [`Request`] and the [`PathParams`] captured by the router (see
//! [`initial_state`]). Every other request-derived value is produced on
//! demand by a component from [`defaults`]:
//!
//! - request parts: [`Method`](http::Method), [`Uri`](http::Uri),
//!   [`HeaderMap`](http::HeaderMap), [`Header`], [`QueryString`](stoa_core::QueryString),
//!   [`QueryParams`](stoa_core::QueryParams), [`Body`]
//! - [`PrimitiveParamComponent`] - untyped and scalar parameters
//! - [`StructuredParamComponent`] - structured request types

#![doc(html_root_url = "https://docs.rs/stoa-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod parts;
mod request;
mod validation;

use std::sync::Arc;

use stoa_core::PathParams;
use stoa_inject::{Component, InitialState, StateKey};

pub use parts::{Body, Header};
pub use request::Request;
pub use validation::{PrimitiveParamComponent, StructuredParamComponent};

/// State key of the inbound [`Request`].
pub const REQUEST_KEY: StateKey = StateKey::from_static("request");

/// State key of the captured [`PathParams`].
pub const PATH_PARAMS_KEY: StateKey = StateKey::from_static("path_params");

/// Declares the values the transport seeds before resolution.
pub fn initial_state() -> InitialState {
    InitialState::new()
        .provide::<Request>(REQUEST_KEY)
        .provide::<PathParams>(PATH_PARAMS_KEY)
}

/// Returns the built-in components in lookup order.
pub fn defaults() -> Vec<Arc<dyn Component>> {
    vec![
        Arc::new(parts::method()),
        Arc::new(parts::uri()),
        Arc::new(parts::headers()),
        Arc::new(parts::header()),
        Arc::new(parts::query_string()),
        Arc::new(parts::query_params()),
        Arc::new(parts::body()),
        Arc::new(PrimitiveParamComponent::new()),
        Arc::new(StructuredParamComponent::new()),
    ]
}
