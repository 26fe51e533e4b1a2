//! Execution plans.

use std::collections::HashSet;

use stoa_core::{Function, Value};

use crate::state::StateKey;

static RETURN_KEY: StateKey = StateKey::RETURN_VALUE;

/// One function call in a plan.
#[derive(Debug, Clone)]
pub struct Step {
    pub(crate) function: Function,
    pub(crate) is_async: bool,
    pub(crate) kwargs: Vec<(String, StateKey)>,
    pub(crate) consts: Vec<(String, Value)>,
    pub(crate) output: StateKey,
    pub(crate) set_return: bool,
}

impl Step {
    /// The function to call.
    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Whether the call must be awaited.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Arguments read from state: `(parameter name, state key)`.
    pub fn kwargs(&self) -> &[(String, StateKey)] {
        &self.kwargs
    }

    /// Arguments bound to constants: `(parameter name, value)`.
    pub fn consts(&self) -> &[(String, Value)] {
        &self.consts
    }

    /// Key the result is stored under.
    pub fn output(&self) -> &StateKey {
        &self.output
    }

    /// Whether the result is also stored under [`StateKey::RETURN_VALUE`].
    pub fn sets_return(&self) -> bool {
        self.set_return
    }

    /// Keys this step writes.
    pub fn writes(&self) -> impl Iterator<Item = &StateKey> {
        std::iter::once(&self.output).chain(self.set_return.then_some(&RETURN_KEY))
    }
}

/// An ordered sequence of steps solving the dependencies of a function batch.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    /// Wraps resolved steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Returns the steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns `true` if any step must be awaited.
    pub fn has_async_steps(&self) -> bool {
        self.steps.iter().any(Step::is_async)
    }

    /// Returns the function names in execution order.
    pub fn function_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.function.name()).collect()
    }

    /// Checks that every key a step reads is in `available` or was written by
    /// an earlier step. Returns the first offending key.
    pub fn check_order<'a>(
        &'a self,
        available: impl IntoIterator<Item = &'a StateKey>,
    ) -> Result<(), &'a StateKey> {
        let mut written: HashSet<&StateKey> = available.into_iter().collect();
        for step in &self.steps {
            if let Some((_, key)) = step.kwargs.iter().find(|(_, key)| !written.contains(key)) {
                return Err(key);
            }
            written.extend(step.writes());
        }
        Ok(())
    }
}
