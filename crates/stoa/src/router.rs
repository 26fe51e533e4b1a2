//! Request routing and path matching.
//!
//! Routes are tried in registration order. A template is split on `/` into
//! literal segments, `{name}` segments that capture one path segment, and a
//! trailing `{+name}` segment that captures the rest of the path, slashes
//! included.
//!
//! # Example
//!
//! ```rust
//! use stoa::router::{RouteMatch, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, "/users/{id}", 0).unwrap();
//! router.insert(Method::GET, "/static/{+path}", 1).unwrap();
//!
//! let RouteMatch::Found { index, params } = router.find(&Method::GET, "/static/css/site.css") else {
//!     panic!("expected a match");
//! };
//! assert_eq!(index, 1);
//! assert_eq!(params.get("path"), Some("css/site.css"));
//! ```

use http::Method;
use stoa_core::{ConfigurationError, PathParams};

/// The outcome of matching a request against the route table.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteMatch {
    /// A route matched.
    Found {
        /// Index the route was registered with.
        index: usize,
        /// Captured path parameters.
        params: PathParams,
    },
    /// The path matched, but not for this method.
    MethodNotAllowed {
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },
    /// No route matched the path.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
    Remainder(String),
}

#[derive(Debug, Clone)]
struct Entry {
    method: Method,
    url: String,
    segments: Vec<PathSegment>,
    index: usize,
}

impl Entry {
    fn match_path(&self, path: &str) -> Option<PathParams> {
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = PathParams::new();

        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Literal(expected) => {
                    if actual.get(position) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                PathSegment::Param(name) => {
                    params.insert(name.as_str(), *actual.get(position)?);
                }
                PathSegment::Remainder(name) => {
                    let rest = actual.get(position..).filter(|rest| !rest.is_empty())?;
                    params.insert(name.as_str(), rest.join("/"));
                    return Some(params);
                }
            }
        }

        (actual.len() == self.segments.len()).then_some(params)
    }
}

fn parse_segments(url: &str) -> Vec<PathSegment> {
    url.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => match name.strip_prefix('+') {
                Some(rest) => PathSegment::Remainder(rest.to_string()),
                None => PathSegment::Param(name.to_string()),
            },
            None => PathSegment::Literal(s.to_string()),
        })
        .collect()
}

/// A linear route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    entries: Vec<Entry>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route under `index`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::DuplicateRoute` if the same method and
    /// URL template are already registered.
    pub fn insert(
        &mut self,
        method: Method,
        url: &str,
        index: usize,
    ) -> Result<(), ConfigurationError> {
        if self
            .entries
            .iter()
            .any(|entry| entry.method == method && entry.url == url)
        {
            return Err(ConfigurationError::DuplicateRoute {
                method: method.to_string(),
                url: url.to_string(),
            });
        }
        self.entries.push(Entry {
            segments: parse_segments(url),
            method,
            url: url.to_string(),
            index,
        });
        Ok(())
    }

    /// Matches a request path.
    pub fn find(&self, method: &Method, path: &str) -> RouteMatch {
        let mut allowed = Vec::new();
        for entry in &self.entries {
            if let Some(params) = entry.match_path(path) {
                if entry.method == *method {
                    return RouteMatch::Found {
                        index: entry.index,
                        params,
                    };
                }
                if !allowed.contains(&entry.method) {
                    allowed.push(entry.method.clone());
                }
            }
        }

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed { allowed }
        }
    }

    /// Returns the number of registered routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        let mut router = Router::new();
        router.insert(Method::GET, "/", 0).unwrap();
        router.insert(Method::GET, "/users/{id}", 1).unwrap();
        router.insert(Method::DELETE, "/users/{id}", 2).unwrap();
        router.insert(Method::GET, "/users/me", 3).unwrap();
        router.insert(Method::GET, "/files/{+path}", 4).unwrap();
        router
    }

    fn found(m: RouteMatch) -> (usize, PathParams) {
        match m {
            RouteMatch::Found { index, params } => (index, params),
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_root_and_params() {
        let router = router();
        assert_eq!(found(router.find(&Method::GET, "/")).0, 0);

        let (index, params) = found(router.find(&Method::GET, "/users/42"));
        assert_eq!(index, 1);
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn test_registration_order_wins() {
        let (index, params) = found(router().find(&Method::GET, "/users/me"));
        assert_eq!(index, 1);
        assert_eq!(params.get("id"), Some("me"));
    }

    #[test]
    fn test_remainder_segment() {
        let router = router();
        let (index, params) = found(router.find(&Method::GET, "/files/a/b/c.txt"));
        assert_eq!(index, 4);
        assert_eq!(params.get("path"), Some("a/b/c.txt"));
        assert_eq!(router.find(&Method::GET, "/files"), RouteMatch::NotFound);
    }

    #[test]
    fn test_method_not_allowed() {
        match router().find(&Method::PUT, "/users/1") {
            RouteMatch::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, vec![Method::GET, Method::DELETE]);
            }
            other => panic!("expected 405, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found() {
        let router = router();
        assert_eq!(router.find(&Method::GET, "/posts"), RouteMatch::NotFound);
        assert_eq!(router.find(&Method::GET, "/users/1/posts"), RouteMatch::NotFound);
    }

    #[test]
    fn test_duplicate_route() {
        let mut router = router();
        let err = router.insert(Method::GET, "/users/{id}", 9).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateRoute { .. }));
        assert_eq!(router.len(), 5);
    }
}
