//! Handler signatures.
//!
//! Rust functions carry no runtime-inspectable parameter list, so every
//! function the injector or the route builder looks at is wrapped in a
//! [`Function`]: a callable plus its declared [`Parameter`]s, return
//! [`Annotation`] and documentation text.
//!
//! Arguments travel between resolution steps as type-erased [`Value`]s,
//! collected per call into [`Args`].

use std::any::{Any, TypeId};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::types::TypeSchema;
use crate::validators::Validator;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type SyncBody = Arc<dyn Fn(Args) -> Result<Value> + Send + Sync>;
type AsyncBody = Arc<dyn Fn(Args) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

// ============================================================================
// Values
// ============================================================================

/// A type-erased, cheaply cloneable value stored in per-request state.
///
/// # Example
///
/// ```
/// use stoa_core::Value;
/// use serde_json::json;
///
/// let v = Value::json(json!({"id": 1}));
/// assert_eq!(v.as_json(), Some(&json!({"id": 1})));
///
/// let n = Value::new(42_u32);
/// assert_eq!(n.downcast_ref::<u32>(), Some(&42));
/// assert!(n.as_json().is_none());
/// ```
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wraps any sendable value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wraps a JSON value.
    pub fn json(value: impl Into<Json>) -> Self {
        Self::new(value.into())
    }

    /// The unit value, returned by functions with nothing to return.
    pub fn none() -> Self {
        Self::new(())
    }

    /// Returns a reference to the inner value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Returns `true` if the inner value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Returns the inner JSON value, if this value holds one.
    pub fn as_json(&self) -> Option<&Json> {
        self.downcast_ref::<Json>()
    }

    /// Returns `true` for the unit value.
    pub fn is_none(&self) -> bool {
        self.is::<()>()
    }

    /// Returns the Rust type name of the inner value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_json() {
            Some(json) => f.debug_tuple("Value").field(json).finish(),
            None => f.debug_tuple("Value").field(&self.type_name).finish(),
        }
    }
}

/// Keyword arguments for a single function call.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: IndexMap<String, Value>,
}

impl Args {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Returns `true` if the argument is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns an argument.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.values.get(name).ok_or_else(|| Error::MissingArgument {
            name: name.to_string(),
        })
    }

    /// Returns an argument downcast to `T`.
    pub fn get_as<T: Any>(&self, name: &str) -> Result<&T> {
        self.get(name)?
            .downcast_ref::<T>()
            .ok_or_else(|| Error::Downcast {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Returns a JSON argument.
    pub fn json(&self, name: &str) -> Result<&Json> {
        self.get_as::<Json>(name)
    }

    /// Returns a parameter-descriptor argument.
    ///
    /// `None` when the function was resolved at the top level rather than on
    /// behalf of another function's parameter.
    pub fn parameter(&self, name: &str) -> Result<Option<&Parameter>> {
        self.get_as::<Option<Parameter>>(name).map(Option::as_ref)
    }

    /// Returns the number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(name, value)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ============================================================================
// Annotations
// ============================================================================

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Whole numbers.
    Int,
    /// Floating point numbers.
    Float,
    /// Booleans.
    Bool,
    /// Text.
    Str,
}

impl Scalar {
    /// Returns the scalar's type name.
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Str => "str",
        }
    }

    /// Returns a fresh validator for this scalar.
    pub fn validator(self) -> Validator {
        match self {
            Self::Int => Validator::integer(),
            Self::Float => Validator::number(),
            Self::Bool => Validator::boolean(),
            Self::Str => Validator::string(),
        }
    }
}

/// Identifies a Rust type used as an annotation, e.g. the inbound request.
#[derive(Clone, Copy)]
pub struct TypeMarker {
    id: TypeId,
    full_name: &'static str,
}

impl TypeMarker {
    /// Returns the marker for `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            full_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the type name with module paths stripped from every segment,
    /// generic arguments included (`Option<Db>`).
    pub fn name(&self) -> String {
        short_type_name(self.full_name)
    }

    /// Returns the fully qualified type name.
    pub const fn full_name(&self) -> &'static str {
        self.full_name
    }

    /// Returns the type id.
    pub const fn id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TypeMarker {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeMarker {}

impl std::hash::Hash for TypeMarker {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeMarker({})", self.name())
    }
}

fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = 0;
    let mut rest = full;
    while let Some(c) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("::") {
            out.truncate(segment);
            rest = tail;
            continue;
        }
        out.push(c);
        if !(c.is_alphanumeric() || c == '_') {
            segment = out.len();
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// The declared type of a parameter or return value.
#[derive(Debug, Clone)]
pub enum Annotation {
    /// No annotation.
    Untyped,
    /// A built-in scalar type.
    Scalar(Scalar),
    /// The generic "one query parameter" marker.
    QueryParam,
    /// A validator instance.
    Validator(Validator),
    /// A structured request type.
    Structured(Arc<TypeSchema>),
    /// A list of a structured type. Only meaningful as a return annotation.
    ListOf(Arc<TypeSchema>),
    /// A Rust type resolved from initial state or by a component.
    Type(TypeMarker),
    /// The value returned by the last handler of the batch.
    ReturnValue,
    /// The parameter descriptor the enclosing function is resolving for.
    ParameterDescriptor,
}

impl Annotation {
    /// Returns the annotation for Rust type `T`.
    pub fn of<T: Any>() -> Self {
        Self::Type(TypeMarker::of::<T>())
    }

    /// Returns a list-of-structured-type annotation.
    pub fn list_of(schema: impl Into<Arc<TypeSchema>>) -> Self {
        Self::ListOf(schema.into())
    }

    /// Returns the type marker, if this is a [`Annotation::Type`].
    pub const fn marker(&self) -> Option<TypeMarker> {
        match self {
            Self::Type(marker) => Some(*marker),
            _ => None,
        }
    }

    /// Returns the validator, if this is a [`Annotation::Validator`].
    pub const fn validator(&self) -> Option<&Validator> {
        match self {
            Self::Validator(validator) => Some(validator),
            _ => None,
        }
    }

    /// Returns `true` for [`Annotation::Untyped`].
    pub const fn is_untyped(&self) -> bool {
        matches!(self, Self::Untyped)
    }

    /// Returns the name used in identities and messages.
    pub fn type_name(&self) -> String {
        match self {
            Self::Untyped => "untyped".to_string(),
            Self::Scalar(scalar) => scalar.type_name().to_string(),
            Self::QueryParam => "QueryParam".to_string(),
            Self::Validator(validator) => validator.kind_name().to_string(),
            Self::Structured(schema) => schema.name().to_string(),
            Self::ListOf(schema) => format!("[{}]", schema.name()),
            Self::Type(marker) => marker.name(),
            Self::ReturnValue => "ReturnValue".to_string(),
            Self::ParameterDescriptor => "Parameter".to_string(),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

impl From<Scalar> for Annotation {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<Validator> for Annotation {
    fn from(validator: Validator) -> Self {
        Self::Validator(validator)
    }
}

impl From<TypeSchema> for Annotation {
    fn from(schema: TypeSchema) -> Self {
        Self::Structured(Arc::new(schema))
    }
}

impl From<Arc<TypeSchema>> for Annotation {
    fn from(schema: Arc<TypeSchema>) -> Self {
        Self::Structured(schema)
    }
}

impl From<TypeMarker> for Annotation {
    fn from(marker: TypeMarker) -> Self {
        Self::Type(marker)
    }
}

/// One declared input of a function.
///
/// A default of `Some(Json::Null)` means "defaults to null", which is
/// different from having no default.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    annotation: Annotation,
    default: Option<Json>,
}

impl Parameter {
    /// Creates a parameter without a default.
    pub fn new(name: impl Into<String>, annotation: impl Into<Annotation>) -> Self {
        Self {
            name: name.into(),
            annotation: annotation.into(),
            default: None,
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Json>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared annotation.
    pub const fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Returns the default value.
    pub const fn default(&self) -> Option<&Json> {
        self.default.as_ref()
    }

    /// Returns `true` if a default was declared.
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Returns the validator for an untyped, scalar or query parameter.
    ///
    /// Scalars use their own validator and everything else is read as a
    /// string. A declared default is carried over, and a null default also
    /// permits null.
    pub fn scalar_validator(&self) -> Validator {
        let validator = match self.annotation {
            Annotation::Scalar(scalar) => scalar.validator(),
            _ => Validator::string(),
        };
        match &self.default {
            Some(Json::Null) => validator.allow_null(true).with_default(Json::Null),
            Some(default) => validator.with_default(default.clone()),
            None => validator,
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// A process-unique function identifier.
///
/// Clones of a [`Function`] share their id; building the same closure twice
/// yields two ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(u64);

impl FunctionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

enum Body {
    Sync(SyncBody),
    Async(AsyncBody),
}

struct FunctionInner {
    id: FunctionId,
    name: String,
    params: Vec<Parameter>,
    returns: Annotation,
    doc: Option<String>,
    body: Body,
}

/// A callable with a declared signature.
///
/// # Example
///
/// ```
/// use stoa_core::{Args, Function, Scalar, Value};
/// use serde_json::json;
///
/// let double = Function::builder("double")
///     .param("n", Scalar::Int)
///     .sync(|args| {
///         let n = args.json("n")?.as_i64().unwrap_or_default();
///         Ok(Value::json(n * 2))
///     });
///
/// let mut args = Args::new();
/// args.insert("n", Value::json(21));
/// let out = double.call(args).unwrap();
/// assert_eq!(out.as_json(), Some(&json!(42)));
/// ```
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionInner>,
}

impl Function {
    /// Starts building a function.
    pub fn builder(name: impl Into<String>) -> FunctionBuilder {
        FunctionBuilder::new(name)
    }

    /// Returns the function's identity.
    pub fn id(&self) -> FunctionId {
        self.inner.id
    }

    /// Returns the function name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the declared parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.inner.params
    }

    /// Returns the declared return annotation.
    pub fn returns(&self) -> &Annotation {
        &self.inner.returns
    }

    /// Returns the documentation text.
    pub fn doc(&self) -> Option<&str> {
        self.inner.doc.as_deref()
    }

    /// Returns `true` if the body is asynchronous.
    pub fn is_async(&self) -> bool {
        matches!(self.inner.body, Body::Async(_))
    }

    /// Calls a synchronous function.
    pub fn call(&self, args: Args) -> Result<Value> {
        match &self.inner.body {
            Body::Sync(body) => body(args),
            Body::Async(_) => Err(Error::AsyncStepInSyncRunner {
                function: self.inner.name.clone(),
            }),
        }
    }

    /// Calls the function, awaiting it if asynchronous.
    pub fn call_async(&self, args: Args) -> BoxFuture<'static, Result<Value>> {
        match &self.inner.body {
            Body::Sync(body) => Box::pin(std::future::ready(body(args))),
            Body::Async(body) => body(args),
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Function {}

impl std::hash::Hash for Function {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("params", &self.inner.params.len())
            .field("is_async", &self.is_async())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Function`].
#[derive(Debug)]
pub struct FunctionBuilder {
    name: String,
    params: Vec<Parameter>,
    returns: Annotation,
    doc: Option<String>,
}

impl FunctionBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: Annotation::Untyped,
            doc: None,
        }
    }

    /// Declares a parameter without a default.
    #[must_use]
    pub fn param(self, name: impl Into<String>, annotation: impl Into<Annotation>) -> Self {
        self.parameter(Parameter::new(name, annotation))
    }

    /// Declares a parameter with a default value.
    #[must_use]
    pub fn param_with_default(
        self,
        name: impl Into<String>,
        annotation: impl Into<Annotation>,
        default: impl Into<Json>,
    ) -> Self {
        self.parameter(Parameter::new(name, annotation).with_default(default))
    }

    /// Declares a prepared parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.params.push(parameter);
        self
    }

    /// Declares the return annotation.
    #[must_use]
    pub fn returns(mut self, annotation: impl Into<Annotation>) -> Self {
        self.returns = annotation.into();
        self
    }

    /// Sets the documentation text (Markdown).
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Finishes with a synchronous body.
    pub fn sync<F>(self, body: F) -> Function
    where
        F: Fn(Args) -> Result<Value> + Send + Sync + 'static,
    {
        self.finish(Body::Sync(Arc::new(body)))
    }

    /// Finishes with an asynchronous body.
    pub fn async_fn<F, Fut>(self, body: F) -> Function
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.finish(Body::Async(Arc::new(move |args| Box::pin(body(args)))))
    }

    fn finish(self, body: Body) -> Function {
        Function {
            inner: Arc::new(FunctionInner {
                id: FunctionId::next(),
                name: self.name,
                params: self.params,
                returns: self.returns,
                doc: self.doc,
                body,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Session;

    #[test]
    fn test_value_downcast() {
        let v = Value::new(String::from("x"));
        assert_eq!(v.downcast_ref::<String>().map(String::as_str), Some("x"));
        assert!(v.downcast_ref::<u8>().is_none());
        assert!(Value::none().is_none());
    }

    #[test]
    fn test_args_errors() {
        let mut args = Args::new();
        args.insert("n", Value::json(1));

        assert!(matches!(
            args.get("missing"),
            Err(Error::MissingArgument { .. })
        ));
        assert!(matches!(
            args.get_as::<String>("n"),
            Err(Error::Downcast { .. })
        ));
        assert_eq!(args.json("n").unwrap(), &json!(1));
    }

    #[test]
    fn test_args_parameter_descriptor() {
        let mut args = Args::new();
        args.insert(
            "parameter",
            Value::new(Some(Parameter::new("user_agent", Annotation::Untyped))),
        );
        args.insert("top", Value::new(None::<Parameter>));

        assert_eq!(
            args.parameter("parameter").unwrap().map(Parameter::name),
            Some("user_agent")
        );
        assert!(args.parameter("top").unwrap().is_none());
    }

    #[test]
    fn test_scalar_validator_from_default() {
        let required = Parameter::new("a", Annotation::Untyped);
        assert!(required.scalar_validator().is_required());
        assert_eq!(required.scalar_validator().kind_name(), "String");

        let nullable = Parameter::new("d", Scalar::Str).with_default(Json::Null);
        assert!(nullable.scalar_validator().allows_null());
        assert!(!nullable.scalar_validator().is_required());

        let defaulted = Parameter::new("page", Scalar::Int).with_default(1);
        assert_eq!(defaulted.scalar_validator().default(), Some(&json!(1)));
        assert_eq!(defaulted.scalar_validator().kind_name(), "Integer");
    }

    #[test]
    fn test_type_marker_identity() {
        assert_eq!(TypeMarker::of::<Session>(), TypeMarker::of::<Session>());
        assert_ne!(TypeMarker::of::<Session>(), TypeMarker::of::<String>());
        assert_eq!(TypeMarker::of::<Session>().name(), "Session");
        assert_eq!(TypeMarker::of::<Vec<u8>>().name(), "Vec<u8>");
    }

    #[test]
    fn test_type_marker_name_keeps_generics() {
        mod users {
            pub struct Db;
        }

        assert_eq!(TypeMarker::of::<Option<users::Db>>().name(), "Option<Db>");
        assert_eq!(
            TypeMarker::of::<Result<String, Vec<users::Db>>>().name(),
            "Result<String, Vec<Db>>"
        );
        assert_eq!(TypeMarker::of::<(u8, &'static str)>().name(), "(u8, &str)");
        assert_ne!(
            Annotation::of::<Option<users::Db>>().type_name(),
            Annotation::of::<Option<String>>().type_name()
        );
        assert!(TypeMarker::of::<users::Db>().full_name().ends_with("users::Db"));
    }

    #[test]
    fn test_annotation_type_names() {
        assert_eq!(Annotation::from(Scalar::Int).type_name(), "int");
        assert_eq!(Annotation::from(Validator::number()).type_name(), "Number");
        assert_eq!(Annotation::of::<Session>().type_name(), "Session");
        assert_eq!(Annotation::Untyped.to_string(), "untyped");
    }

    #[test]
    fn test_function_identity() {
        let f = Function::builder("f").sync(|_| Ok(Value::none()));
        let g = Function::builder("f").sync(|_| Ok(Value::none()));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
        assert_ne!(f.id(), g.id());
    }

    #[test]
    fn test_builder_records_signature() {
        let f = Function::builder("list")
            .param("page", Scalar::Int)
            .param_with_default("q", Scalar::Str, json!(null))
            .returns(Validator::array(Validator::string()))
            .doc("List things.")
            .sync(|_| Ok(Value::none()));

        assert_eq!(f.name(), "list");
        assert_eq!(f.parameters().len(), 2);
        assert!(!f.parameters()[0].has_default());
        assert_eq!(f.parameters()[1].default(), Some(&json!(null)));
        assert_eq!(f.doc(), Some("List things."));
        assert!(matches!(f.returns(), Annotation::Validator(_)));
    }

    #[test]
    fn test_sync_call_rejects_async() {
        let f = Function::builder("later").async_fn(|_| async { Ok(Value::none()) });
        assert!(f.is_async());
        assert!(matches!(
            f.call(Args::new()),
            Err(Error::AsyncStepInSyncRunner { .. })
        ));
    }

    #[tokio::test]
    async fn test_call_async_runs_both_kinds() {
        let sync = Function::builder("now").sync(|_| Ok(Value::json(1)));
        let asynchronous = Function::builder("later").async_fn(|_| async { Ok(Value::json(2)) });

        let a = sync.call_async(Args::new()).await.unwrap();
        let b = asynchronous.call_async(Args::new()).await.unwrap();
        assert_eq!(a.as_json(), Some(&json!(1)));
        assert_eq!(b.as_json(), Some(&json!(2)));
    }
}
