//! Property tests for plan building.
//!
//! Each case generates a random dependency DAG of components, where node
//! `i` may depend on any node `j < i`, and a handler that depends on a
//! random subset of nodes. Every node resolver returns `i` plus the sum of
//! its dependencies, so the handler result can be checked independently.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use stoa_core::{Annotation, Function, Value};
use stoa_inject::{Component, FnComponent, InitialState, Injector, State};

const MAX_NODES: usize = 8;

fn node_name(i: usize) -> String {
    format!("dep{i}")
}

fn sum_args(args: &stoa_core::Args) -> stoa_core::Result<i64> {
    let mut total = 0;
    for (name, _) in args.iter() {
        total += args.json(name)?.as_i64().unwrap_or_default();
    }
    Ok(total)
}

fn build_graph(deps: &[Vec<bool>], handler_deps: &[bool]) -> (Vec<Arc<dyn Component>>, Function) {
    let mut components: Vec<Arc<dyn Component>> = Vec::new();
    for (i, row) in deps.iter().enumerate() {
        let mut builder = Function::builder(format!("make{i}"));
        for j in (0..i).filter(|j| row[*j]) {
            builder = builder.param(node_name(j), Annotation::Untyped);
        }
        let own = i64::try_from(i).unwrap();
        let resolver = builder.sync(move |args| Ok(Value::json(own + sum_args(&args)?)));
        let name = node_name(i);
        components.push(Arc::new(FnComponent::new(resolver, move |p| p.name() == name)));
    }

    let mut handler = Function::builder("handler");
    for j in (0..deps.len()).filter(|j| handler_deps[*j]) {
        handler = handler.param(node_name(j), Annotation::Untyped);
    }
    let handler = handler.sync(|args| Ok(Value::json(sum_args(&args)?)));
    (components, handler)
}

fn expected_value(deps: &[Vec<bool>], i: usize) -> i64 {
    let own = i64::try_from(i).unwrap();
    own + (0..i)
        .filter(|j| deps[i][*j])
        .map(|j| expected_value(deps, j))
        .sum::<i64>()
}

fn graph_strategy() -> impl Strategy<Value = (Vec<Vec<bool>>, Vec<bool>)> {
    (1..=MAX_NODES).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::collection::vec(any::<bool>(), MAX_NODES), n),
            prop::collection::vec(any::<bool>(), MAX_NODES),
        )
    })
}

proptest! {
    #[test]
    fn prop_plan_is_deterministic((deps, handler_deps) in graph_strategy()) {
        let (components, handler) = build_graph(&deps, &handler_deps);
        let injector = Injector::new(components, InitialState::new());

        let first = injector.resolve_functions(&[handler.clone()]).unwrap();
        let second = injector.resolve_functions(&[handler]).unwrap();

        let shape = |steps: &[stoa_inject::Step]| {
            steps
                .iter()
                .map(|s| (s.function().name().to_string(), s.output().clone(), s.kwargs().to_vec()))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn prop_plan_is_topological((deps, handler_deps) in graph_strategy()) {
        let (components, handler) = build_graph(&deps, &handler_deps);
        let injector = Injector::new(components, InitialState::new());

        let plan = injector.plan(&[handler]).unwrap();
        prop_assert!(plan.check_order(injector.initial().keys()).is_ok());
    }

    #[test]
    fn prop_each_component_runs_once((deps, handler_deps) in graph_strategy()) {
        let (components, handler) = build_graph(&deps, &handler_deps);
        let injector = Injector::new(components, InitialState::new());

        let plan = injector.plan(&[handler]).unwrap();
        let mut names = plan.function_names();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), total);
        prop_assert_eq!(plan.steps().last().map(|s| s.function().name()), Some("handler"));
    }

    #[test]
    fn prop_run_computes_expected_value((deps, handler_deps) in graph_strategy()) {
        let (components, handler) = build_graph(&deps, &handler_deps);
        let injector = Injector::new(components, InitialState::new());

        let expected: i64 = (0..deps.len())
            .filter(|j| handler_deps[*j])
            .map(|j| expected_value(&deps, j))
            .sum();

        let out = injector.run(&[handler], &mut State::new()).unwrap();
        prop_assert_eq!(out.as_json(), Some(&json!(expected)));
    }
}
