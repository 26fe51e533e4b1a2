//! The injector.
//!
//! Given a batch of functions, the injector inspects each declared
//! parameter and decides where its value comes from:
//!
//! | Annotation | Source |
//! |---|---|
//! | `ReturnValue` | the reserved return-value key |
//! | a type declared in [`InitialState`] | the seeded state key |
//! | `ParameterDescriptor` | the parameter being resolved for, as a constant |
//! | a [`Validator`] | a synthesized step reading path then query parameters |
//! | anything else | the first registered [`Component`] that accepts it |
//!
//! The result is a [`Plan`]: steps in dependency order, each computing one
//! state key exactly once per resolution. Plans are cached per batch.
//!
//! Plans are built lazily, so a misconfigured handler fails on the first
//! request that uses it. Call [`Injector::prepare`] at startup to surface
//! configuration errors before traffic arrives.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use stoa_core::{
    Annotation, ConfigurationError, Function, Parameter, PathParams, QueryParams, Result,
    Validator, Value,
};
use tracing::{debug, warn};

use crate::cache::{PlanCache, PlanKey};
use crate::component::Component;
use crate::executor::{BlockingExecutor, Executor, SuspendingExecutor};
use crate::plan::{Plan, Step};
use crate::state::{InitialState, State, StateKey};

/// Keys already computed (or being computed) within one batch resolution.
#[derive(Debug, Clone, Default)]
pub struct SeenState {
    seen: HashSet<StateKey>,
    in_progress: HashSet<StateKey>,
}

impl SeenState {
    /// Starts a resolution where the initial keys are already present.
    pub fn new(initial: &InitialState) -> Self {
        Self {
            seen: initial.keys().cloned().collect(),
            in_progress: HashSet::new(),
        }
    }

    /// Returns `true` if the key is already computed by an earlier step.
    pub fn contains(&self, key: &StateKey) -> bool {
        self.seen.contains(key)
    }

    /// Returns the number of computed keys.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` if nothing has been computed.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Where a parameter's value comes from.
enum Binding {
    ReturnValue,
    Initial(StateKey),
    Descriptor,
    Validated(Validator),
    Component(Arc<dyn Component>),
}

/// Resolves function dependencies and runs the resulting plans.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use stoa_core::{Annotation, Function, Value};
/// use stoa_inject::{Component, FnComponent, InitialState, Injector, State};
///
/// struct Greeting(String);
///
/// let greeting: Arc<dyn Component> = Arc::new(FnComponent::for_type::<Greeting>(
///     Function::builder("greeting")
///         .returns(Annotation::of::<Greeting>())
///         .sync(|_| Ok(Value::new(Greeting("hello".into())))),
/// ));
///
/// let handler = Function::builder("handler")
///     .param("greeting", Annotation::of::<Greeting>())
///     .sync(|args| {
///         let g = args.get_as::<Greeting>("greeting")?;
///         Ok(Value::json(g.0.clone()))
///     });
///
/// let injector = Injector::new([greeting], InitialState::new());
/// let mut state = State::new();
/// let out = injector.run(&[handler], &mut state).unwrap();
/// assert_eq!(out.as_json(), Some(&serde_json::json!("hello")));
/// ```
pub struct Injector {
    components: Vec<Arc<dyn Component>>,
    initial: InitialState,
    allow_async: bool,
    executor: Arc<dyn Executor>,
    cache: PlanCache,
}

impl Injector {
    /// Creates an injector that only accepts synchronous functions.
    ///
    /// Components are consulted in the given order; the first one whose
    /// [`Component::can_handle`] returns `true` wins.
    pub fn new(
        components: impl IntoIterator<Item = Arc<dyn Component>>,
        initial: InitialState,
    ) -> Self {
        Self::build(components, initial, false, Arc::new(BlockingExecutor))
    }

    /// Creates an injector that also accepts async functions.
    pub fn new_async(
        components: impl IntoIterator<Item = Arc<dyn Component>>,
        initial: InitialState,
    ) -> Self {
        Self::build(components, initial, true, Arc::new(SuspendingExecutor))
    }

    fn build(
        components: impl IntoIterator<Item = Arc<dyn Component>>,
        initial: InitialState,
        allow_async: bool,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            components: components.into_iter().collect(),
            initial,
            allow_async,
            executor,
            cache: PlanCache::new(),
        }
    }

    /// Returns `true` if async functions are accepted.
    pub fn allows_async(&self) -> bool {
        self.allow_async
    }

    /// Returns the initial-state declaration.
    pub fn initial(&self) -> &InitialState {
        &self.initial
    }

    /// Returns the number of registered components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Returns the plan cache.
    pub fn cache(&self) -> &PlanCache {
        &self.cache
    }

    /// Resolves one function and everything it depends on.
    ///
    /// Steps for dependencies not yet in `seen` come first, followed by one
    /// step for `func` itself. The step's output key is the initial-state key
    /// of the return annotation if there is one, else `output` if given, else
    /// [`StateKey::RETURN_VALUE`].
    pub fn resolve_function(
        &self,
        func: &Function,
        output: Option<StateKey>,
        seen: &mut SeenState,
        parent: Option<&Parameter>,
        set_return: bool,
    ) -> Result<Vec<Step>, ConfigurationError> {
        if func.is_async() && !self.allow_async {
            warn!(function = func.name(), "async function given to a blocking injector");
            return Err(ConfigurationError::AsyncNotAllowed {
                function: func.name().to_string(),
            });
        }

        let output = self
            .initial
            .key_for(func.returns())
            .cloned()
            .or(output)
            .unwrap_or(StateKey::RETURN_VALUE);

        let mut steps = Vec::new();
        let mut kwargs = Vec::with_capacity(func.parameters().len());
        let mut consts = Vec::new();

        for parameter in func.parameters() {
            let name = parameter.name().to_string();
            match self.classify(func, parameter)? {
                Binding::ReturnValue => kwargs.push((name, StateKey::RETURN_VALUE)),
                Binding::Initial(key) => kwargs.push((name, key)),
                Binding::Descriptor => consts.push((name, Value::new(parent.cloned()))),
                Binding::Validated(validator) => {
                    let key = StateKey::new(format!("{}:{}", validator.kind_tag(), parameter.name()));
                    let resolver = validated_param(parameter.name(), validator);
                    let bound =
                        self.resolve_dependency(func, &resolver, &key, parameter, seen, &mut steps)?;
                    kwargs.push((name, bound));
                }
                Binding::Component(component) => {
                    let key = component.identity(parameter);
                    let bound = self.resolve_dependency(
                        func,
                        component.resolver(),
                        &key,
                        parameter,
                        seen,
                        &mut steps,
                    )?;
                    kwargs.push((name, bound));
                }
            }
        }

        steps.push(Step {
            function: func.clone(),
            is_async: func.is_async(),
            kwargs,
            consts,
            output,
            set_return,
        });
        Ok(steps)
    }

    /// Resolves a batch of functions sharing one [`SeenState`].
    ///
    /// Dependencies common to several functions are computed once. Only the
    /// last function's result is stored as the return value.
    pub fn resolve_functions(&self, funcs: &[Function]) -> Result<Vec<Step>, ConfigurationError> {
        let mut seen = SeenState::new(&self.initial);
        let mut steps = Vec::new();
        let last = funcs.len().saturating_sub(1);
        for (index, func) in funcs.iter().enumerate() {
            steps.extend(self.resolve_function(func, None, &mut seen, None, index == last)?);
        }
        Ok(steps)
    }

    /// Returns the plan for a batch, building and caching it on a miss.
    pub fn plan(&self, funcs: &[Function]) -> Result<Arc<Plan>, ConfigurationError> {
        let key = PlanKey::of(funcs);
        if let Some(plan) = self.cache.get(&key) {
            return Ok(plan);
        }

        let steps = match self.resolve_functions(funcs) {
            Ok(steps) => steps,
            Err(err) => {
                warn!(error = %err, "failed to build execution plan");
                return Err(err);
            }
        };
        let plan = Plan::new(steps);
        debug!(
            functions = ?funcs.iter().map(Function::name).collect::<Vec<_>>(),
            steps = plan.len(),
            "built execution plan"
        );
        Ok(self.cache.insert(key, plan))
    }

    /// Builds and caches the plan for a batch without running it.
    pub fn prepare(&self, funcs: &[Function]) -> Result<(), ConfigurationError> {
        self.plan(funcs).map(|_| ())
    }

    /// Runs a batch on the calling thread.
    ///
    /// Returns the result of the last step, or the unit value for an empty
    /// batch.
    pub fn run(&self, funcs: &[Function], state: &mut State) -> Result<Value> {
        if funcs.is_empty() {
            return Ok(Value::none());
        }
        let plan = self.plan(funcs)?;
        let result = BlockingExecutor.run(&plan, state);
        log_failure(&result);
        result
    }

    /// Runs a batch, awaiting async steps.
    pub async fn run_async(&self, funcs: &[Function], state: &mut State) -> Result<Value> {
        if funcs.is_empty() {
            return Ok(Value::none());
        }
        let plan = self.plan(funcs)?;
        let result = self.executor.execute(&plan, state).await;
        log_failure(&result);
        result
    }

    fn classify(&self, func: &Function, parameter: &Parameter) -> Result<Binding, ConfigurationError> {
        let annotation = parameter.annotation();
        if matches!(annotation, Annotation::ReturnValue) {
            return Ok(Binding::ReturnValue);
        }
        if let Some(key) = self.initial.key_for(annotation) {
            return Ok(Binding::Initial(key.clone()));
        }
        if matches!(annotation, Annotation::ParameterDescriptor) {
            return Ok(Binding::Descriptor);
        }
        if let Annotation::Validator(validator) = annotation {
            return Ok(Binding::Validated(validator.clone()));
        }

        self.components
            .iter()
            .find(|component| component.can_handle(parameter))
            .map(|component| Binding::Component(Arc::clone(component)))
            .ok_or_else(|| {
                warn!(
                    parameter = parameter.name(),
                    function = func.name(),
                    "no component for parameter"
                );
                ConfigurationError::NoComponent {
                    parameter: parameter.name().to_string(),
                    function: func.name().to_string(),
                }
            })
    }

    /// Resolves `resolver` under identity `key` unless already seen, and
    /// returns the state key its value is stored at.
    fn resolve_dependency(
        &self,
        func: &Function,
        resolver: &Function,
        key: &StateKey,
        parameter: &Parameter,
        seen: &mut SeenState,
        steps: &mut Vec<Step>,
    ) -> Result<StateKey, ConfigurationError> {
        let bound = self
            .initial
            .key_for(resolver.returns())
            .cloned()
            .unwrap_or_else(|| key.clone());

        if seen.in_progress.contains(key) {
            warn!(key = %key, function = func.name(), "dependency cycle");
            return Err(ConfigurationError::DependencyCycle {
                key: key.to_string(),
                function: func.name().to_string(),
            });
        }
        if seen.seen.contains(key) {
            return Ok(bound);
        }

        seen.in_progress.insert(key.clone());
        let resolved = self.resolve_function(resolver, Some(key.clone()), seen, Some(parameter), false);
        seen.in_progress.remove(key);

        steps.extend(resolved?);
        seen.seen.insert(key.clone());
        Ok(bound)
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("components", &self.components.len())
            .field("initial", &self.initial)
            .field("allow_async", &self.allow_async)
            .field("cached_plans", &self.cache.len())
            .finish()
    }
}

/// Builds the step that reads a validator-annotated parameter from the path,
/// falling back to the query string.
fn validated_param(name: &str, validator: Validator) -> Function {
    let field = name.to_string();
    Function::builder(format!("validate_{name}"))
        .param("path_params", Annotation::of::<PathParams>())
        .param("query_params", Annotation::of::<QueryParams>())
        .returns(validator.clone())
        .sync(move |args| {
            let path = args.get_as::<PathParams>("path_params")?;
            let query = args.get_as::<QueryParams>("query_params")?;
            let raw = path.get_json(&field).or_else(|| query.get_json(&field));
            let value = validator.validate_field(&field, raw.as_ref())?;
            Ok(Value::json(value))
        })
}

fn log_failure(result: &Result<Value>) {
    if let Err(err) = result {
        match err.validation_errors() {
            Some(errors) => debug!(fields = ?errors.fields().collect::<Vec<_>>(), "validation failed"),
            None => debug!(error = %err, "resolution failed"),
        }
    }
}
