//! Typed field validators.
//!
//! A [`Validator`] describes one input value: its kind, whether null is
//! permitted, an optional default and a human-readable description. The
//! route builder uses validators to document fields; the injector uses
//! them to coerce raw request text into JSON values.
//!
//! Validation is lax about representation because query strings and path
//! segments only carry text: `"4"` is an acceptable [`Validator::integer`]
//! input and `"true"` an acceptable [`Validator::boolean`] input.
//!
//! # Example
//!
//! ```
//! use stoa_core::Validator;
//! use serde_json::json;
//!
//! let age = Validator::integer().minimum_int(0);
//! assert_eq!(age.validate(&json!("42")).unwrap(), json!(42));
//! assert!(age.validate(&json!(-1)).is_err());
//!
//! let missing = age.validate_field("age", None).unwrap_err();
//! assert_eq!(missing.get("age"), Some("The \"age\" field is required."));
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// The kind-specific part of a validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorKind {
    /// Text.
    String {
        /// Minimum length in characters.
        #[serde(skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        /// Maximum length in characters.
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// Whole numbers.
    Integer {
        /// Inclusive lower bound.
        #[serde(skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        /// Inclusive upper bound.
        #[serde(skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    /// Finite floating point numbers.
    Number {
        /// Inclusive lower bound.
        #[serde(skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Inclusive upper bound.
        #[serde(skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    /// `true` / `false`.
    Boolean,
    /// A homogeneous list.
    Array {
        /// Validator applied to each item.
        items: Box<Validator>,
        /// Minimum number of items.
        #[serde(skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        /// Maximum number of items.
        #[serde(skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    /// A JSON object with declared properties.
    Object {
        /// Declared properties in declaration order.
        properties: IndexMap<String, Validator>,
        /// Properties that must be present.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        required: Vec<String>,
    },
    /// Accepts any value.
    Any,
}

/// A typed field descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validator {
    #[serde(flatten)]
    kind: ValidatorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    allow_null: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Json>,
}

impl Validator {
    fn of(kind: ValidatorKind) -> Self {
        Self {
            kind,
            description: None,
            allow_null: false,
            default: None,
        }
    }

    /// Creates a string validator.
    #[must_use]
    pub fn string() -> Self {
        Self::of(ValidatorKind::String {
            min_length: None,
            max_length: None,
        })
    }

    /// Creates an integer validator.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(ValidatorKind::Integer {
            minimum: None,
            maximum: None,
        })
    }

    /// Creates a number validator.
    #[must_use]
    pub fn number() -> Self {
        Self::of(ValidatorKind::Number {
            minimum: None,
            maximum: None,
        })
    }

    /// Creates a boolean validator.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(ValidatorKind::Boolean)
    }

    /// Creates an array validator.
    #[must_use]
    pub fn array(items: Validator) -> Self {
        Self::of(ValidatorKind::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        })
    }

    /// Creates an object validator.
    ///
    /// Properties without a default that do not accept null are required.
    #[must_use]
    pub fn object<K: Into<String>>(properties: impl IntoIterator<Item = (K, Validator)>) -> Self {
        let properties: IndexMap<String, Validator> = properties
            .into_iter()
            .map(|(name, validator)| (name.into(), validator))
            .collect();
        let required = properties
            .iter()
            .filter(|(_, validator)| validator.is_required())
            .map(|(name, _)| name.clone())
            .collect();
        Self::of(ValidatorKind::Object {
            properties,
            required,
        })
    }

    /// Creates a validator accepting any value.
    #[must_use]
    pub fn any() -> Self {
        Self::of(ValidatorKind::Any)
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the value used when the field is absent.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Json>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets whether null is an acceptable value.
    #[must_use]
    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = allow;
        self
    }

    /// Sets the minimum length of a string validator.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let ValidatorKind::String { min_length, .. } = &mut self.kind {
            *min_length = Some(len);
        }
        self
    }

    /// Sets the maximum length of a string validator.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        if let ValidatorKind::String { max_length, .. } = &mut self.kind {
            *max_length = Some(len);
        }
        self
    }

    /// Sets the lower bound of an integer validator.
    #[must_use]
    pub fn minimum_int(mut self, min: i64) -> Self {
        if let ValidatorKind::Integer { minimum, .. } = &mut self.kind {
            *minimum = Some(min);
        }
        self
    }

    /// Sets the upper bound of an integer validator.
    #[must_use]
    pub fn maximum_int(mut self, max: i64) -> Self {
        if let ValidatorKind::Integer { maximum, .. } = &mut self.kind {
            *maximum = Some(max);
        }
        self
    }

    /// Sets the lower bound of a number validator.
    #[must_use]
    pub fn minimum(mut self, min: f64) -> Self {
        if let ValidatorKind::Number { minimum, .. } = &mut self.kind {
            *minimum = Some(min);
        }
        self
    }

    /// Sets the upper bound of a number validator.
    #[must_use]
    pub fn maximum(mut self, max: f64) -> Self {
        if let ValidatorKind::Number { maximum, .. } = &mut self.kind {
            *maximum = Some(max);
        }
        self
    }

    /// Sets the minimum number of items of an array validator.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        if let ValidatorKind::Array { min_items, .. } = &mut self.kind {
            *min_items = Some(min);
        }
        self
    }

    /// Sets the maximum number of items of an array validator.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        if let ValidatorKind::Array { max_items, .. } = &mut self.kind {
            *max_items = Some(max);
        }
        self
    }

    /// Replaces the required property list of an object validator.
    #[must_use]
    pub fn required_properties<K: Into<String>>(mut self, names: impl IntoIterator<Item = K>) -> Self {
        if let ValidatorKind::Object { required, .. } = &mut self.kind {
            *required = names.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Returns the kind-specific part.
    #[must_use]
    pub fn kind(&self) -> &ValidatorKind {
        &self.kind
    }

    /// Returns the kind name, e.g. `"Integer"`.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ValidatorKind::String { .. } => "String",
            ValidatorKind::Integer { .. } => "Integer",
            ValidatorKind::Number { .. } => "Number",
            ValidatorKind::Boolean => "Boolean",
            ValidatorKind::Array { .. } => "Array",
            ValidatorKind::Object { .. } => "Object",
            ValidatorKind::Any => "Any",
        }
    }

    /// Returns the short tag used to build state identities, e.g. `"int"`.
    ///
    /// Scalar kinds share their tag with the matching [`Scalar`](crate::Scalar)
    /// type name.
    #[must_use]
    pub fn kind_tag(&self) -> &'static str {
        match self.kind {
            ValidatorKind::String { .. } => "str",
            ValidatorKind::Integer { .. } => "int",
            ValidatorKind::Number { .. } => "float",
            ValidatorKind::Boolean => "bool",
            ValidatorKind::Array { .. } => "array",
            ValidatorKind::Object { .. } => "object",
            ValidatorKind::Any => "any",
        }
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns `true` if null is an acceptable value.
    #[must_use]
    pub fn allows_null(&self) -> bool {
        self.allow_null
    }

    /// Returns the default value, if any.
    #[must_use]
    pub fn default(&self) -> Option<&Json> {
        self.default.as_ref()
    }

    /// Returns `true` if an absent value is an error.
    #[must_use]
    pub fn is_required(&self) -> bool {
        !self.allow_null && self.default.is_none()
    }

    /// Returns the declared properties of an object validator.
    #[must_use]
    pub fn properties(&self) -> Option<&IndexMap<String, Validator>> {
        match &self.kind {
            ValidatorKind::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Rewrites every declared property of an object validator.
    ///
    /// Other kinds are returned unchanged.
    #[must_use]
    pub fn map_properties(mut self, mut f: impl FnMut(Validator) -> Validator) -> Self {
        if let ValidatorKind::Object { properties, .. } = &mut self.kind {
            let taken = std::mem::take(properties);
            *properties = taken.into_iter().map(|(name, v)| (name, f(v))).collect();
        }
        self
    }

    /// Validates a value, returning the coerced value.
    ///
    /// Errors on object properties are keyed by property name; errors on the
    /// value itself are keyed by the empty string.
    pub fn validate(&self, value: &Json) -> Result<Json, ValidationErrors> {
        self.validate_at(value, None)
    }

    /// Validates a named field that may be absent.
    ///
    /// An absent field takes the default, then null if permitted, and is a
    /// "required" error otherwise.
    pub fn validate_field(&self, name: &str, raw: Option<&Json>) -> Result<Json, ValidationErrors> {
        match raw {
            Some(value) => self.validate_at(value, Some(name)),
            None => self.absent(name),
        }
    }

    fn absent(&self, key: &str) -> Result<Json, ValidationErrors> {
        if let Some(default) = &self.default {
            return Ok(default.clone());
        }
        if self.allow_null {
            return Ok(Json::Null);
        }
        Err(ValidationErrors::required(key))
    }

    fn validate_at(&self, value: &Json, key: Option<&str>) -> Result<Json, ValidationErrors> {
        let fail = |message: String| Err(ValidationErrors::single(key.unwrap_or_default(), message));

        if value.is_null() {
            if self.allow_null {
                return Ok(Json::Null);
            }
            return fail("May not be null.".to_string());
        }

        match &self.kind {
            ValidatorKind::String {
                min_length,
                max_length,
            } => {
                let Some(text) = value.as_str() else {
                    return fail("Must be a string.".to_string());
                };
                let len = text.chars().count();
                if let Some(min) = min_length {
                    if len < *min {
                        return fail(format!("Must have at least {min} characters."));
                    }
                }
                if let Some(max) = max_length {
                    if len > *max {
                        return fail(format!("Must have no more than {max} characters."));
                    }
                }
                Ok(value.clone())
            }

            ValidatorKind::Integer { minimum, maximum } => {
                let Some(n) = coerce_integer(value) else {
                    return fail("Must be an integer.".to_string());
                };
                if let Some(min) = minimum {
                    if n < *min {
                        return fail(format!("Must be greater than or equal to {min}."));
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        return fail(format!("Must be less than or equal to {max}."));
                    }
                }
                Ok(Json::from(n))
            }

            ValidatorKind::Number { minimum, maximum } => {
                let Some(n) = coerce_number(value) else {
                    return fail("Must be a number.".to_string());
                };
                if let Some(min) = minimum {
                    if n < *min {
                        return fail(format!("Must be greater than or equal to {min}."));
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        return fail(format!("Must be less than or equal to {max}."));
                    }
                }
                Ok(Json::from(n))
            }

            ValidatorKind::Boolean => match coerce_boolean(value) {
                Some(b) => Ok(Json::Bool(b)),
                None => fail("Must be a valid boolean.".to_string()),
            },

            ValidatorKind::Array {
                items,
                min_items,
                max_items,
            } => {
                let Some(values) = value.as_array() else {
                    return fail("Must be an array.".to_string());
                };
                if let Some(min) = min_items {
                    if values.len() < *min {
                        return fail(format!("Must have at least {min} items."));
                    }
                }
                if let Some(max) = max_items {
                    if values.len() > *max {
                        return fail(format!("Must have no more than {max} items."));
                    }
                }
                let mut errors = ValidationErrors::new();
                let mut out = Vec::with_capacity(values.len());
                for (index, item) in values.iter().enumerate() {
                    let item_key = join_key(key, &index.to_string());
                    match items.validate_at(item, Some(&item_key)) {
                        Ok(v) => out.push(v),
                        Err(e) => errors.merge(e),
                    }
                }
                if errors.is_empty() {
                    Ok(Json::Array(out))
                } else {
                    Err(errors)
                }
            }

            ValidatorKind::Object {
                properties,
                required,
            } => {
                let Some(map) = value.as_object() else {
                    return fail("Must be an object.".to_string());
                };
                let mut errors = ValidationErrors::new();
                let mut out = map.clone();
                for (name, validator) in properties {
                    let prop_key = join_key(key, name);
                    match map.get(name) {
                        Some(raw) => match validator.validate_at(raw, Some(&prop_key)) {
                            Ok(v) => {
                                out.insert(name.clone(), v);
                            }
                            Err(e) => errors.merge(e),
                        },
                        None if required.contains(name) => {
                            errors.merge(ValidationErrors::required(&prop_key));
                        }
                        None => {
                            if let Some(default) = validator.default() {
                                out.insert(name.clone(), default.clone());
                            }
                        }
                    }
                }
                if errors.is_empty() {
                    Ok(Json::Object(out))
                } else {
                    Err(errors)
                }
            }

            ValidatorKind::Any => Ok(value.clone()),
        }
    }
}

fn join_key(parent: Option<&str>, child: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => format!("{parent}.{child}"),
        _ => child.to_string(),
    }
}

/// `i64::MIN` and `i64::MAX + 1` as floats; the upper bound is exclusive.
const I64_FLOAT_RANGE: (f64, f64) = (-9_223_372_036_854_775_808.0, 9_223_372_036_854_775_808.0);

#[allow(clippy::cast_possible_truncation)]
fn coerce_integer(value: &Json) -> Option<i64> {
    let (low, high) = I64_FLOAT_RANGE;
    match value {
        Json::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= low && *f < high)
                .map(|f| f as i64)
        }),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_number(value: &Json) -> Option<f64> {
    match value {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn coerce_boolean(value: &Json) -> Option<bool> {
    match value {
        Json::Bool(b) => Some(*b),
        Json::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Some(true),
            "false" | "0" | "off" | "no" => Some(false),
            _ => None,
        },
        Json::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Field-level validation failures, keyed by field name.
///
/// Serializes to the JSON object the transport layer returns to clients:
///
/// ```
/// use stoa_core::ValidationErrors;
///
/// let errors = ValidationErrors::required("n");
/// assert_eq!(
///     serde_json::to_string(&errors).unwrap(),
///     r#"{"n":"The \"n\" field is required."}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: IndexMap<String, String>,
}

impl ValidationErrors {
    /// Creates an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set with one entry.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Creates the error raised for a missing required field.
    #[must_use]
    pub fn required(field: &str) -> Self {
        Self::single(field, format!("The \"{field}\" field is required."))
    }

    /// Adds an entry, keeping the first message recorded for a field.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Merges another error set into this one.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.fields {
            self.insert(field, message);
        }
    }

    /// Renames the entry keyed by the empty string, if present.
    #[must_use]
    pub fn with_root(mut self, name: &str) -> Self {
        if let Some(message) = self.fields.shift_remove("") {
            self.fields.insert(name.to_string(), message);
        }
        self
    }

    /// Returns the message for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over `(field, message)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// Returns the field names in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_accepts_text() {
        let v = Validator::string().min_length(1).max_length(3);
        assert_eq!(v.validate(&json!("ab")).unwrap(), json!("ab"));
        assert!(v.validate(&json!("")).is_err());
        assert!(v.validate(&json!("abcd")).is_err());
        assert!(v.validate(&json!(5)).is_err());
    }

    #[test]
    fn test_integer_coerces_text() {
        let v = Validator::integer();
        assert_eq!(v.validate(&json!("4")).unwrap(), json!(4));
        assert_eq!(v.validate(&json!(4)).unwrap(), json!(4));
        assert_eq!(v.validate(&json!(4.0)).unwrap(), json!(4));
        let err = v.validate(&json!("four")).unwrap_err();
        assert_eq!(err.get(""), Some("Must be an integer."));
    }

    #[test]
    fn test_integer_rejects_floats_outside_i64() {
        let v = Validator::integer();
        for value in [json!(1e20), json!(-1e20), json!(9_223_372_036_854_775_808.0), json!(u64::MAX)] {
            let err = v.validate(&value).unwrap_err();
            assert_eq!(err.get(""), Some("Must be an integer."));
        }
        assert_eq!(v.validate(&json!(-9_223_372_036_854_775_808.0)).unwrap(), json!(i64::MIN));
        assert!(Validator::integer().maximum_int(10).validate(&json!(1e20)).is_err());
    }

    #[test]
    fn test_integer_bounds() {
        let v = Validator::integer().minimum_int(1).maximum_int(10);
        assert!(v.validate(&json!(0)).is_err());
        assert!(v.validate(&json!(11)).is_err());
        assert!(v.validate(&json!(10)).is_ok());
    }

    #[test]
    fn test_number_coerces_text() {
        let v = Validator::number();
        assert_eq!(v.validate(&json!("2.0")).unwrap(), json!(2.0));
        assert_eq!(v.validate(&json!(2)).unwrap(), json!(2));
        assert!(v.validate(&json!("NaN")).is_err());
        assert!(v.validate(&json!(true)).is_err());
    }

    #[test]
    fn test_boolean_coerces_text() {
        let v = Validator::boolean();
        assert_eq!(v.validate(&json!("true")).unwrap(), json!(true));
        assert_eq!(v.validate(&json!("0")).unwrap(), json!(false));
        assert_eq!(v.validate(&json!(1)).unwrap(), json!(true));
        assert!(v.validate(&json!("maybe")).is_err());
    }

    #[test]
    fn test_null_handling() {
        let strict = Validator::string();
        let err = strict.validate(&json!(null)).unwrap_err();
        assert_eq!(err.get(""), Some("May not be null."));

        let nullable = Validator::string().allow_null(true);
        assert_eq!(nullable.validate(&json!(null)).unwrap(), json!(null));
    }

    #[test]
    fn test_validate_field_absent() {
        let required = Validator::number();
        let err = required.validate_field("n", None).unwrap_err();
        assert_eq!(err.get("n"), Some("The \"n\" field is required."));

        let nullable = Validator::string().allow_null(true);
        assert_eq!(nullable.validate_field("d", None).unwrap(), json!(null));

        let defaulted = Validator::integer().with_default(7);
        assert_eq!(defaulted.validate_field("page", None).unwrap(), json!(7));
    }

    #[test]
    fn test_validate_field_keys_errors_by_name() {
        let err = Validator::integer()
            .validate_field("i", Some(&json!("x")))
            .unwrap_err();
        assert_eq!(err.get("i"), Some("Must be an integer."));
    }

    #[test]
    fn test_object_required_properties() {
        let v = Validator::object([
            ("a", Validator::string()),
            ("b", Validator::integer().allow_null(true)),
            ("c", Validator::boolean().with_default(false)),
        ]);
        let out = v.validate(&json!({"a": "x"})).unwrap();
        assert_eq!(out, json!({"a": "x", "c": false}));

        let err = v.validate(&json!({"b": 1})).unwrap_err();
        assert_eq!(err.get("a"), Some("The \"a\" field is required."));
    }

    #[test]
    fn test_object_preserves_unknown_properties() {
        let v = Validator::object([("a", Validator::string())]);
        let out = v.validate(&json!({"a": "x", "extra": 1})).unwrap();
        assert_eq!(out, json!({"a": "x", "extra": 1}));
    }

    #[test]
    fn test_object_collects_all_errors() {
        let v = Validator::object([("a", Validator::string()), ("f", Validator::number())]);
        let err = v.validate(&json!({"a": 1, "f": "x"})).unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(err.get("a"), Some("Must be a string."));
        assert_eq!(err.get("f"), Some("Must be a number."));
    }

    #[test]
    fn test_array_items_keyed_by_index() {
        let v = Validator::array(Validator::integer()).max_items(3);
        assert_eq!(v.validate(&json!(["1", 2])).unwrap(), json!([1, 2]));
        let err = v.validate(&json!([1, "x"])).unwrap_err();
        assert_eq!(err.get("1"), Some("Must be an integer."));
        assert!(v.validate(&json!([1, 2, 3, 4])).is_err());
    }

    #[test]
    fn test_kind_names_and_tags() {
        assert_eq!(Validator::integer().kind_name(), "Integer");
        assert_eq!(Validator::string().kind_tag(), "str");
        assert_eq!(Validator::number().kind_tag(), "float");
        assert_eq!(Validator::any().kind_name(), "Any");
    }

    #[test]
    fn test_is_required() {
        assert!(Validator::integer().is_required());
        assert!(!Validator::integer().allow_null(true).is_required());
        assert!(!Validator::integer().with_default(1).is_required());
    }

    #[test]
    fn test_with_root() {
        let errors = ValidationErrors::single("", "Must be an object.").with_root("data");
        assert_eq!(errors.get("data"), Some("Must be an object."));
        assert!(errors.get("").is_none());
    }

    #[test]
    fn test_errors_display() {
        let mut errors = ValidationErrors::required("n");
        errors.insert("i", "Must be an integer.");
        assert_eq!(
            errors.to_string(),
            "n: The \"n\" field is required.; i: Must be an integer."
        );
    }

    #[test]
    fn test_validator_serialization() {
        let v = Validator::integer()
            .minimum_int(0)
            .with_description("Page number");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "integer");
        assert_eq!(json["minimum"], 0);
        assert_eq!(json["description"], "Page number");
        assert!(json.get("allow_null").is_none());
    }
}
