//! Plan cache.
//!
//! Plans are keyed by the ordered identities of the functions in a batch.
//! Lookups take a shared read lock. A miss builds the plan outside the lock
//! and inserts it afterwards, so two requests racing on a new batch may both
//! build it; plan building is deterministic and the later insert simply
//! replaces an equal plan.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use stoa_core::{Function, FunctionId};

use crate::plan::Plan;

/// Cache key: the function identities of a batch, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey(Vec<FunctionId>);

impl PlanKey {
    /// Builds the key for a batch.
    pub fn of(funcs: &[Function]) -> Self {
        Self(funcs.iter().map(Function::id).collect())
    }

    /// Returns the identities.
    pub fn ids(&self) -> &[FunctionId] {
        &self.0
    }
}

/// Shared, read-mostly plan storage owned by an injector.
#[derive(Debug, Default)]
pub struct PlanCache {
    plans: RwLock<HashMap<PlanKey, Arc<Plan>>>,
}

impl PlanCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a cached plan.
    pub fn get(&self, key: &PlanKey) -> Option<Arc<Plan>> {
        self.plans.read().get(key).cloned()
    }

    /// Stores a plan, replacing any previous entry, and returns it.
    pub fn insert(&self, key: PlanKey, plan: Plan) -> Arc<Plan> {
        let plan = Arc::new(plan);
        self.plans.write().insert(key, Arc::clone(&plan));
        plan
    }

    /// Returns the number of cached plans.
    pub fn len(&self) -> usize {
        self.plans.read().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.plans.read().is_empty()
    }

    /// Drops every cached plan.
    pub fn clear(&self) {
        self.plans.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stoa_core::Value;

    fn noop(name: &str) -> Function {
        Function::builder(name).sync(|_| Ok(Value::none()))
    }

    #[test]
    fn test_key_is_ordered() {
        let a = noop("a");
        let b = noop("b");
        assert_ne!(
            PlanKey::of(&[a.clone(), b.clone()]),
            PlanKey::of(&[b, a])
        );
    }

    #[test]
    fn test_key_uses_identity_not_name() {
        assert_ne!(PlanKey::of(&[noop("a")]), PlanKey::of(&[noop("a")]));
        let a = noop("a");
        assert_eq!(PlanKey::of(&[a.clone()]), PlanKey::of(&[a]));
    }

    #[test]
    fn test_insert_and_get() {
        let cache = PlanCache::new();
        let key = PlanKey::of(&[noop("a")]);
        assert!(cache.get(&key).is_none());

        let stored = cache.insert(key.clone(), Plan::default());
        let fetched = cache.get(&key).unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
