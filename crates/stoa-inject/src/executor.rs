//! Plan executors.
//!
//! Both executors walk the same immutable [`Plan`] strictly in step order.
//! [`BlockingExecutor`] calls every step on the current thread and refuses
//! async steps. [`SuspendingExecutor`] awaits async steps and calls sync ones
//! directly. Independent steps are never run concurrently.

use stoa_core::{Args, BoxFuture, Error, Result, Value};
use tracing::trace;

use crate::plan::{Plan, Step};
use crate::state::{State, StateKey};

/// A step-execution strategy.
pub trait Executor: Send + Sync {
    /// Runs every step of `plan` against `state`, returning the last step's
    /// result.
    fn execute<'a>(&'a self, plan: &'a Plan, state: &'a mut State) -> BoxFuture<'a, Result<Value>>;
}

/// Runs plans on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingExecutor;

impl BlockingExecutor {
    /// Runs a plan to completion.
    pub fn run(&self, plan: &Plan, state: &mut State) -> Result<Value> {
        let mut last = Value::none();
        for step in plan.steps() {
            if step.is_async() {
                return Err(Error::AsyncStepInSyncRunner {
                    function: step.function().name().to_string(),
                });
            }
            let args = gather_args(step, state)?;
            trace!(function = step.function().name(), output = %step.output(), "running step");
            let value = step.function().call(args)?;
            record(step, state, &value);
            last = value;
        }
        Ok(last)
    }
}

impl Executor for BlockingExecutor {
    fn execute<'a>(&'a self, plan: &'a Plan, state: &'a mut State) -> BoxFuture<'a, Result<Value>> {
        Box::pin(std::future::ready(self.run(plan, state)))
    }
}

/// Runs plans on the current task, suspending at async steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuspendingExecutor;

impl Executor for SuspendingExecutor {
    fn execute<'a>(&'a self, plan: &'a Plan, state: &'a mut State) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            let mut last = Value::none();
            for step in plan.steps() {
                let args = gather_args(step, state)?;
                trace!(
                    function = step.function().name(),
                    output = %step.output(),
                    is_async = step.is_async(),
                    "running step"
                );
                let value = if step.is_async() {
                    step.function().call_async(args).await?
                } else {
                    step.function().call(args)?
                };
                record(step, state, &value);
                last = value;
            }
            Ok(last)
        })
    }
}

fn gather_args(step: &Step, state: &State) -> Result<Args> {
    let mut args = Args::new();
    for (name, key) in step.kwargs() {
        args.insert(name.clone(), state.require(key)?.clone());
    }
    for (name, value) in step.consts() {
        args.insert(name.clone(), value.clone());
    }
    Ok(args)
}

fn record(step: &Step, state: &mut State, value: &Value) {
    state.insert(step.output().clone(), value.clone());
    if step.sets_return() {
        state.insert(StateKey::RETURN_VALUE, value.clone());
    }
}
