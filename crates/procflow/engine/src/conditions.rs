//! Named condition registry

use crate::contract::ConditionRegistry;
use serde_json::Value;
use std::collections::BTreeMap;

type Predicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Table of named predicates over JSON state
///
/// Evaluating an id nothing was registered under logs a warning and
/// yields `false`, so a loop with a misspelt condition still stops at its
/// bound rather than on the first pass.
#[derive(Default)]
pub struct ConditionTable {
    predicates: BTreeMap<String, Predicate>,
}

impl ConditionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition<F>(mut self, id: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.register(id, predicate);
        self
    }

    pub fn register<F>(&mut self, id: impl Into<String>, predicate: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(id.into(), Box::new(predicate));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.predicates.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl ConditionRegistry<Value> for ConditionTable {
    fn evaluate(&self, condition_id: &str, state: &Value) -> bool {
        match self.predicates.get(condition_id) {
            Some(predicate) => predicate(state),
            None => {
                tracing::warn!(condition = %condition_id, "Unknown condition, evaluating to false");
                false
            }
        }
    }
}

impl std::fmt::Debug for ConditionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionTable")
            .field("conditions", &self.predicates.keys().collect::<Vec<_>>())
            .finish()
    }
}
