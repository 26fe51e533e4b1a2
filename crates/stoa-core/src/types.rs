//! Structured request types.

use serde::Serialize;
use serde_json::Value as Json;

use crate::validators::{ValidationErrors, Validator, ValidatorKind};

/// A named set of validated properties, used as a request body type or,
/// for `GET`/`DELETE` routes, as a bundle of query parameters.
///
/// # Example
///
/// ```
/// use stoa_core::{TypeSchema, Validator};
/// use serde_json::json;
///
/// let user = TypeSchema::new("User", [
///     ("name", Validator::string()),
///     ("age", Validator::integer().allow_null(true)),
/// ]);
///
/// assert!(user.is_required("name"));
/// assert!(!user.is_required("age"));
/// assert!(user.validate(&json!({"name": "ada"})).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSchema {
    name: String,
    #[serde(flatten)]
    validator: Validator,
}

impl TypeSchema {
    /// Creates a structured type from its properties.
    pub fn new<K: Into<String>>(
        name: impl Into<String>,
        properties: impl IntoIterator<Item = (K, Validator)>,
    ) -> Self {
        Self {
            name: name.into(),
            validator: Validator::object(properties),
        }
    }

    /// Sets whether the whole value may be null.
    #[must_use]
    pub fn allow_null(mut self, allow: bool) -> Self {
        self.validator = self.validator.allow_null(allow);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.validator = self.validator.with_description(description);
        self
    }

    /// Replaces the required property list.
    #[must_use]
    pub fn required_properties<K: Into<String>>(mut self, names: impl IntoIterator<Item = K>) -> Self {
        self.validator = self.validator.required_properties(names);
        self
    }

    /// Returns the type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the object validator describing the whole type.
    pub const fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Iterates over the declared properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Validator)> {
        self.validator
            .properties()
            .into_iter()
            .flatten()
            .map(|(name, validator)| (name.as_str(), validator))
    }

    /// Returns the validator of one property.
    pub fn property(&self, name: &str) -> Option<&Validator> {
        self.validator.properties().and_then(|props| props.get(name))
    }

    /// Returns `true` if the property must be present.
    pub fn is_required(&self, name: &str) -> bool {
        match self.validator.kind() {
            ValidatorKind::Object { required, .. } => required.iter().any(|r| r == name),
            _ => false,
        }
    }

    /// Validates a value against the whole type.
    pub fn validate(&self, value: &Json) -> Result<Json, ValidationErrors> {
        self.validator.validate(value)
    }
}
