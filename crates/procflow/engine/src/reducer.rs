//! Field-policy state reducer

use crate::contract::StateReducer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// How one top-level state field merges updates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldPolicy {
    /// Last write wins
    #[default]
    Overwrite,
    /// Updates are appended to a list
    Accumulate,
}

/// Reducer over JSON object state with a policy per top-level field
///
/// Fields without a declared policy overwrite. A null update changes
/// nothing; a non-object update replaces the state wholesale.
#[derive(Clone, Debug, Default)]
pub struct FieldPolicyReducer {
    policies: HashMap<String, FieldPolicy>,
}

impl FieldPolicyReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, field: impl Into<String>, policy: FieldPolicy) -> Self {
        self.policies.insert(field.into(), policy);
        self
    }

    pub fn accumulate(self, field: impl Into<String>) -> Self {
        self.with_policy(field, FieldPolicy::Accumulate)
    }

    pub fn policy_of(&self, field: &str) -> FieldPolicy {
        self.policies.get(field).copied().unwrap_or_default()
    }
}

impl StateReducer<Value> for FieldPolicyReducer {
    fn reduce(&self, current: &Value, update: Value) -> Value {
        let fields = match update {
            Value::Null => return current.clone(),
            Value::Object(fields) => fields,
            other => return other,
        };

        let mut merged = match current {
            Value::Object(existing) => existing.clone(),
            _ => Map::new(),
        };
        for (key, value) in fields {
            match self.policy_of(&key) {
                FieldPolicy::Overwrite => {
                    merged.insert(key, value);
                }
                FieldPolicy::Accumulate => {
                    let slot = merged.entry(key).or_insert_with(|| Value::Array(Vec::new()));
                    append(slot, value);
                }
            }
        }
        Value::Object(merged)
    }
}

fn append(slot: &mut Value, value: Value) {
    if !slot.is_array() {
        let previous = slot.take();
        *slot = Value::Array(if previous.is_null() { Vec::new() } else { vec![previous] });
    }
    if let Value::Array(items) = slot {
        match value {
            Value::Array(more) => items.extend(more),
            Value::Null => {}
            single => items.push(single),
        }
    }
}
