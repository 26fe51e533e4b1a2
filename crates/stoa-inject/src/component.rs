//! Components.
//!
//! A [`Component`] knows how to produce a value for a category of
//! parameters. The injector asks each registered component, in
//! registration order, whether it can handle a parameter; the first that
//! says yes supplies the value by running its resolver function, whose own
//! parameters are resolved recursively.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use stoa_core::{Annotation, Function, Parameter, TypeMarker};

use crate::state::StateKey;

/// A pluggable value provider.
pub trait Component: Send + Sync {
    /// Returns `true` if this component supplies values for `parameter`.
    fn can_handle(&self, parameter: &Parameter) -> bool;

    /// The function that computes the value.
    fn resolver(&self) -> &Function;

    /// Returns the state key the computed value is stored under.
    ///
    /// Two parameters with the same identity share one computed value within
    /// a resolution.
    fn identity(&self, parameter: &Parameter) -> StateKey {
        default_identity(self.resolver(), parameter)
    }
}

/// Builds the identity used by [`Component::identity`] unless overridden.
///
/// Keys start with the resolver's name and [`FunctionId`](stoa_core::FunctionId),
/// so resolvers that share a name never share a value. A resolver that reads
/// the parameter descriptor produces one value per annotation and parameter
/// name (`"header#7:untyped:user_agent"`); any other resolver produces one
/// value per resolution (`"query_params#3:QueryParams"`).
pub fn default_identity(resolver: &Function, parameter: &Parameter) -> StateKey {
    let reads_descriptor = resolver
        .parameters()
        .iter()
        .any(|p| matches!(p.annotation(), Annotation::ParameterDescriptor));

    if reads_descriptor {
        StateKey::new(format!(
            "{}{}:{}:{}",
            resolver.name(),
            resolver.id(),
            parameter.annotation().type_name(),
            parameter.name().to_lowercase()
        ))
    } else {
        StateKey::new(format!(
            "{}{}:{}",
            resolver.name(),
            resolver.id(),
            resolver.returns().type_name()
        ))
    }
}

type Predicate = Arc<dyn Fn(&Parameter) -> bool + Send + Sync>;

/// A component assembled from a resolver and a predicate.
///
/// # Example
///
/// ```
/// use stoa_core::{Annotation, Function, Parameter, Value};
/// use stoa_inject::{Component, FnComponent};
///
/// struct Clock(u64);
///
/// let clock = FnComponent::for_type::<Clock>(
///     Function::builder("clock")
///         .returns(Annotation::of::<Clock>())
///         .sync(|_| Ok(Value::new(Clock(0)))),
/// );
///
/// assert!(clock.can_handle(&Parameter::new("now", Annotation::of::<Clock>())));
/// assert!(!clock.can_handle(&Parameter::new("now", Annotation::Untyped)));
/// ```
#[derive(Clone)]
pub struct FnComponent {
    resolver: Function,
    predicate: Predicate,
}

impl FnComponent {
    /// Creates a component handling every parameter accepted by `predicate`.
    pub fn new<P>(resolver: Function, predicate: P) -> Self
    where
        P: Fn(&Parameter) -> bool + Send + Sync + 'static,
    {
        Self {
            resolver,
            predicate: Arc::new(predicate),
        }
    }

    /// Creates a component handling parameters annotated with type `T`.
    pub fn for_type<T: Any>(resolver: Function) -> Self {
        let marker = TypeMarker::of::<T>();
        Self::new(resolver, move |parameter| {
            parameter.annotation().marker() == Some(marker)
        })
    }
}

impl Component for FnComponent {
    fn can_handle(&self, parameter: &Parameter) -> bool {
        (self.predicate)(parameter)
    }

    fn resolver(&self) -> &Function {
        &self.resolver
    }
}

impl fmt::Debug for FnComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComponent")
            .field("resolver", &self.resolver.name())
            .finish_non_exhaustive()
    }
}
