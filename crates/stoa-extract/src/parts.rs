//! Components exposing parts of the inbound request.
//!
//! Each component resolves one value type from the [`Request`] (or from a
//! value derived from it):
//!
//! | Annotation | Value |
//! |---|---|
//! | [`Method`] | the request method |
//! | [`Uri`] | the request URI |
//! | [`HeaderMap`] | all request headers |
//! | [`Header`] | one header, named after the parameter |
//! | [`QueryString`] | the raw query string |
//! | [`QueryParams`] | decoded query parameters |
//! | [`Body`] | the raw request body |

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use stoa_core::{Annotation, Function, QueryParams, QueryString, Value};
use stoa_inject::FnComponent;

use crate::request::Request;

/// A single request header, looked up by parameter name.
///
/// Underscores in the parameter name become dashes, and the lookup is case
/// insensitive, so a parameter `user_agent: Header` reads `User-Agent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header(pub Option<String>);

impl Header {
    /// Returns the header value.
    pub fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// The raw request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body(pub Bytes);

impl Body {
    /// Returns the body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.0
    }
}

fn from_request<T, F>(name: &str, extract: F) -> FnComponent
where
    T: Send + Sync + 'static,
    F: Fn(&Request) -> T + Send + Sync + 'static,
{
    FnComponent::for_type::<T>(
        Function::builder(name)
            .param("request", Annotation::of::<Request>())
            .returns(Annotation::of::<T>())
            .sync(move |args| Ok(Value::new(extract(args.get_as::<Request>("request")?)))),
    )
}

/// Resolves [`Method`] parameters.
pub fn method() -> FnComponent {
    from_request("method", |request| request.method().clone())
}

/// Resolves [`Uri`] parameters.
pub fn uri() -> FnComponent {
    from_request("uri", |request| request.uri().clone())
}

/// Resolves [`HeaderMap`] parameters.
pub fn headers() -> FnComponent {
    from_request("headers", |request| request.headers().clone())
}

/// Resolves [`QueryString`] parameters.
pub fn query_string() -> FnComponent {
    from_request("query_string", |request| {
        QueryString::new(request.query_string())
    })
}

/// Resolves [`Body`] parameters.
pub fn body() -> FnComponent {
    from_request("body", |request| Body(request.body().clone()))
}

/// Resolves [`QueryParams`] parameters by decoding the [`QueryString`].
pub fn query_params() -> FnComponent {
    FnComponent::for_type::<QueryParams>(
        Function::builder("query_params")
            .param("query_string", Annotation::of::<QueryString>())
            .returns(Annotation::of::<QueryParams>())
            .sync(|args| {
                let raw = args.get_as::<QueryString>("query_string")?;
                Ok(Value::new(QueryParams::parse(raw)))
            }),
    )
}

/// Resolves [`Header`] parameters.
pub fn header() -> FnComponent {
    FnComponent::for_type::<Header>(
        Function::builder("header")
            .param("headers", Annotation::of::<HeaderMap>())
            .param("parameter", Annotation::ParameterDescriptor)
            .returns(Annotation::of::<Header>())
            .sync(|args| {
                let headers = args.get_as::<HeaderMap>("headers")?;
                let value = args.parameter("parameter")?.and_then(|parameter| {
                    let name = parameter.name().replace('_', "-");
                    headers
                        .get(name.as_str())
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                });
                Ok(Value::new(Header(value)))
            }),
    )
}
