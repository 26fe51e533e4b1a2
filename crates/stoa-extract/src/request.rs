//! The inbound request as seen by components.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// An inbound HTTP request with a fully buffered body.
///
/// This is the root of per-request state: every built-in component derives
/// its value from it or from the [`PathParams`](stoa_core::PathParams)
/// captured by the router.
///
/// # Example
///
/// ```rust
/// use stoa_extract::Request;
/// use http::Method;
///
/// let request = Request::new(Method::GET, "/users/1?full=true".parse().unwrap());
/// assert_eq!(request.path(), "/users/1");
/// assert_eq!(request.query_string(), "full=true");
/// assert!(request.is_body_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Sets the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the query string, or an empty string.
    #[must_use]
    pub fn query_string(&self) -> &str {
        self.uri.query().unwrap_or_default()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Checks if the request body is empty.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl<B: Into<Bytes>> From<http::Request<B>> for Request {
    fn from(request: http::Request<B>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_request() {
        let request: Request = http::Request::builder()
            .method(Method::POST)
            .uri("/1?a=2")
            .header("content-type", "application/json")
            .body(r#"{"a":"a"}"#)
            .unwrap()
            .into();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.path(), "/1");
        assert_eq!(request.query_string(), "a=2");
        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(request.body().as_ref(), br#"{"a":"a"}"#);
    }

    #[test]
    fn test_missing_query_is_empty() {
        let request = Request::new(Method::GET, Uri::from_static("/"));
        assert_eq!(request.query_string(), "");
        assert!(request.header("accept").is_none());
    }
}
