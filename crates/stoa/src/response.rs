//! Outbound responses and the mapping from handler results.
//!
//! Handlers return a type-erased [`Value`]. [`Response::from_value`] turns it
//! into something a transport can send:
//!
//! | Handler result | Response |
//! |---|---|
//! | a [`Response`] | passed through |
//! | a JSON value | `200`, `application/json` |
//! | a `String` or `&'static str` | `200`, `text/plain` |
//! | the unit value | `204`, empty body |
//!
//! Failures go through [`Response::from_error`]: validation errors become a
//! `400` carrying the field to message object, everything else a `500`.

use bytes::Bytes;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde_json::{json, Value as Json};
use stoa_core::{Error, Value};
use tracing::warn;

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// A fully buffered HTTP response.
///
/// # Example
///
/// ```rust
/// use stoa::Response;
/// use serde_json::json;
///
/// let response = Response::json(http::StatusCode::CREATED, &json!({"id": 1}));
/// assert_eq!(response.status(), http::StatusCode::CREATED);
/// assert_eq!(response.content_type(), Some("application/json"));
/// assert_eq!(response.json_body(), Some(json!({"id": 1})));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Creates a JSON response.
    pub fn json(status: StatusCode, body: &Json) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => Self::new(status, bytes)
                .with_header(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE)),
            Err(err) => {
                warn!(error = %err, "failed to serialize response body");
                Self::internal_error()
            }
        }
    }

    /// Creates a `200` plain-text response.
    pub fn text(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body.into())
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE))
    }

    /// Creates a `204` response.
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, Bytes::new())
    }

    /// Creates a JSON error response with a `message` field.
    pub fn message(status: StatusCode, message: &str) -> Self {
        Self::json(status, &json!({ "message": message }))
    }

    fn internal_error() -> Self {
        let body = r#"{"message":"Internal server error"}"#;
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
    }

    /// Sets a header, replacing any previous value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the status code.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the `Content-Type` header, if it is valid text.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parses the body as JSON.
    pub fn json_body(&self) -> Option<Json> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Converts into an `http::Response`.
    pub fn into_http(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }

    /// Maps a handler result to a response.
    pub fn from_value(value: &Value) -> Self {
        if let Some(response) = value.downcast_ref::<Response>() {
            return response.clone();
        }
        if let Some(body) = value.as_json() {
            return Self::json(StatusCode::OK, body);
        }
        if let Some(text) = value.downcast_ref::<String>() {
            return Self::text(text.as_str());
        }
        if let Some(text) = value.downcast_ref::<&'static str>() {
            return Self::text(*text);
        }
        if value.is_none() {
            return Self::no_content();
        }

        warn!(type_name = value.type_name(), "handler returned a value with no response mapping");
        Self::internal_error()
    }

    /// Maps a failure to a response.
    ///
    /// Only validation errors expose their details to the client.
    pub fn from_error(err: &Error) -> Self {
        match err.validation_errors() {
            Some(errors) => match serde_json::to_value(errors) {
                Ok(body) => Self::json(StatusCode::BAD_REQUEST, &body),
                Err(_) => Self::internal_error(),
            },
            None => Self::internal_error().with_status(err.status_code()),
        }
    }
}

impl From<Response> for http::Response<Bytes> {
    fn from(response: Response) -> Self {
        response.into_http()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stoa_core::{ConfigurationError, ValidationErrors};

    #[test]
    fn test_from_json_value() {
        let response = Response::from_value(&Value::json(json!({"ok": true})));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.json_body(), Some(json!({"ok": true})));
    }

    #[test]
    fn test_from_text_values() {
        let owned = Response::from_value(&Value::new(String::from("hello")));
        assert_eq!(owned.body().as_ref(), b"hello");
        assert_eq!(owned.content_type(), Some(TEXT_CONTENT_TYPE));

        let borrowed = Response::from_value(&Value::new("hi"));
        assert_eq!(borrowed.body().as_ref(), b"hi");
    }

    #[test]
    fn test_from_unit_value() {
        let response = Response::from_value(&Value::none());
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_response_passes_through() {
        let original = Response::text("teapot").with_status(StatusCode::IM_A_TEAPOT);
        let response = Response::from_value(&Value::new(original.clone()));
        assert_eq!(response, original);
    }

    #[test]
    fn test_unmapped_value_is_internal_error() {
        let response = Response::from_value(&Value::new(42_u8));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_response() {
        let err = Error::from(ValidationErrors::required("n"));
        let response = Response::from_error(&err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json_body(),
            Some(json!({"n": "The \"n\" field is required."}))
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = Error::from(ConfigurationError::AsyncNotAllowed {
            function: "fetch".to_string(),
        });
        let response = Response::from_error(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json_body(),
            Some(json!({"message": "Internal server error"}))
        );
    }

    #[test]
    fn test_into_http() {
        let response = Response::text("ok").into_http();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"ok");
        assert!(response.headers().contains_key(header::CONTENT_TYPE));
    }
}
