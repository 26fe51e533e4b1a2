//! Per-request state.
//!
//! [`State`] holds every value computed while serving one request, keyed by
//! [`StateKey`]. It is seeded by the transport with the keys declared in
//! [`InitialState`] and grows as plan steps execute.

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use stoa_core::{Annotation, Error, Result, TypeMarker, Value};

/// A key into per-request state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(Cow<'static, str>);

impl StateKey {
    /// The reserved key holding the handler's return value.
    pub const RETURN_VALUE: Self = Self(Cow::Borrowed("return_value"));

    /// Creates a key from a static string.
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    /// Creates a key from an owned string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    /// Returns the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for StateKey {
    fn from(key: &'static str) -> Self {
        Self::from_static(key)
    }
}

impl From<String> for StateKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// Values computed for one resolution.
///
/// Never shared between concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct State {
    values: HashMap<StateKey, Value>,
}

impl State {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a value, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<StateKey>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Stores a value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<StateKey>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Returns a value.
    pub fn get(&self, key: &StateKey) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns a value or [`Error::MissingState`].
    pub fn require(&self, key: &StateKey) -> Result<&Value> {
        self.values.get(key).ok_or_else(|| Error::MissingState {
            key: key.to_string(),
        })
    }

    /// Returns a value downcast to `T`.
    pub fn get_as<T: Any>(&self, key: &StateKey) -> Option<&T> {
        self.get(key).and_then(Value::downcast_ref::<T>)
    }

    /// Returns the value stored under [`StateKey::RETURN_VALUE`].
    pub fn return_value(&self) -> Option<&Value> {
        self.get(&StateKey::RETURN_VALUE)
    }

    /// Returns `true` if the key is present.
    pub fn contains(&self, key: &StateKey) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Declares which annotation types are present in state before resolution
/// begins, and under which key.
///
/// # Example
///
/// ```
/// use stoa_core::{Annotation, PathParams};
/// use stoa_inject::InitialState;
///
/// let initial = InitialState::new().provide::<PathParams>("path_params");
/// let key = initial.key_for(&Annotation::of::<PathParams>()).unwrap();
/// assert_eq!(key.as_str(), "path_params");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InitialState {
    entries: IndexMap<TypeMarker, StateKey>,
}

impl InitialState {
    /// Creates an empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that values of type `T` are seeded under `key`.
    #[must_use]
    pub fn provide<T: Any>(mut self, key: impl Into<StateKey>) -> Self {
        self.insert(TypeMarker::of::<T>(), key);
        self
    }

    /// Declares a marker and its key.
    pub fn insert(&mut self, marker: TypeMarker, key: impl Into<StateKey>) {
        self.entries.insert(marker, key.into());
    }

    /// Returns the key for an annotation, if it names an initial type.
    pub fn key_for(&self, annotation: &Annotation) -> Option<&StateKey> {
        annotation.marker().and_then(|marker| self.entries.get(&marker))
    }

    /// Iterates over the declared keys.
    pub fn keys(&self) -> impl Iterator<Item = &StateKey> {
        self.entries.values()
    }

    /// Returns the number of declared entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Request;

    #[test]
    fn test_state_key_display() {
        assert_eq!(StateKey::RETURN_VALUE.to_string(), "return_value");
        assert_eq!(StateKey::new("int:n"), StateKey::from("int:n".to_string()));
    }

    #[test]
    fn test_state_require() {
        let state = State::new().with("a", Value::json(1));
        assert!(state.require(&StateKey::from("a")).is_ok());
        let err = state.require(&StateKey::from("b")).unwrap_err();
        assert!(matches!(err, Error::MissingState { key } if key == "b"));
    }

    #[test]
    fn test_state_get_as() {
        let state = State::new().with("n", Value::json(json!(3)));
        assert_eq!(
            state.get_as::<serde_json::Value>(&StateKey::from("n")),
            Some(&json!(3))
        );
        assert!(state.get_as::<String>(&StateKey::from("n")).is_none());
    }

    #[test]
    fn test_initial_state_lookup() {
        let initial = InitialState::new().provide::<Request>("request");
        assert_eq!(initial.len(), 1);
        assert!(initial.key_for(&Annotation::of::<Request>()).is_some());
        assert!(initial.key_for(&Annotation::of::<String>()).is_none());
        assert!(initial.key_for(&Annotation::Untyped).is_none());
    }
}
