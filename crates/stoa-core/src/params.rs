//! Raw request parameters.
//!
//! These are the text-only inputs the validators read from: the raw query
//! string, the decoded query parameters and the path parameters captured by
//! the route matcher.

use std::ops::Deref;

use indexmap::IndexMap;
use serde_json::Value as Json;

/// The raw query string, without the leading `?`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString(pub String);

impl QueryString {
    /// Wraps a query string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the query string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for QueryString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Decoded query parameters.
///
/// Repeated keys are kept in order; [`QueryParams::get`] returns the first.
///
/// # Example
///
/// ```
/// use stoa_core::QueryParams;
///
/// let params = QueryParams::parse("a=2&b=true&tag=x&tag=y");
/// assert_eq!(params.get("a"), Some("2"));
/// assert_eq!(params.get_all("tag").collect::<Vec<_>>(), vec!["x", "y"]);
/// assert_eq!(params.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a query string. Undecodable input yields an empty set.
    pub fn parse(raw: &str) -> Self {
        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(raw).unwrap_or_default();
        Self { pairs }
    }

    /// Adds a pair.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Returns the first value for a key.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for a key.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first value for a key as a JSON string.
    pub fn get_json(&self, name: &str) -> Option<Json> {
        self.get(name).map(|v| Json::String(v.to_string()))
    }

    /// Returns the number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over the pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the first value of every key as a JSON object.
    pub fn to_json_object(&self) -> Json {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.pairs {
            map.entry(name.clone())
                .or_insert_with(|| Json::String(value.clone()));
        }
        Json::Object(map)
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Path parameters captured from the URL template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    inner: IndexMap<String, String>,
}

impl PathParams {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), value.into());
    }

    /// Returns a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    /// Returns a parameter as a JSON string.
    pub fn get_json(&self, name: &str) -> Option<Json> {
        self.get(name).map(|v| Json::String(v.to_string()))
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over the parameters in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_params_decoding() {
        let params = QueryParams::parse("a=2&s=hello+world&f=1.0&e=%3D");
        assert_eq!(params.len(), 4);
        assert_eq!(params.get("s"), Some("hello world"));
        assert_eq!(params.get("e"), Some("="));
    }

    #[test]
    fn test_query_params_empty() {
        assert!(QueryParams::parse("").is_empty());
    }

    #[test]
    fn test_query_params_first_wins() {
        let params = QueryParams::parse("x=1&x=2");
        assert_eq!(params.get("x"), Some("1"));
        assert_eq!(params.to_json_object(), json!({"x": "1"}));
    }

    #[test]
    fn test_query_params_get_json() {
        let params = QueryParams::parse("i=4");
        assert_eq!(params.get_json("i"), Some(json!("4")));
        assert_eq!(params.get_json("n"), None);
    }

    #[test]
    fn test_path_params() {
        let params: PathParams = [("p", "1"), ("rest", "a/b")].into_iter().collect();
        assert_eq!(params.get("p"), Some("1"));
        assert_eq!(params.get("rest"), Some("a/b"));
        assert_eq!(params.iter().count(), 2);
    }

    #[test]
    fn test_query_string_deref() {
        let qs = QueryString::new("a=1");
        assert_eq!(&*qs, "a=1");
        assert_eq!(qs.as_str(), "a=1");
    }
}
