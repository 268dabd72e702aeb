//! Simulated step executor

use crate::contract::{StepExecutor, StepFailure};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

type StepFn = Box<dyn Fn(&Value) -> Result<Value, StepFailure> + Send + Sync>;

/// Executor backed by one closure per work type
///
/// Work types with no closure succeed with an empty update.
#[derive(Default)]
pub struct SimulatedExecutor {
    steps: BTreeMap<String, StepFn>,
}

impl SimulatedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step<F>(mut self, work_type: impl Into<String>, step: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, StepFailure> + Send + Sync + 'static,
    {
        self.steps.insert(work_type.into(), Box::new(step));
        self
    }

    /// A work type that always fails
    pub fn with_failing_step(
        self,
        work_type: impl Into<String>,
        failure: StepFailure,
    ) -> Self {
        self.with_step(work_type, move |_| Err(failure.clone()))
    }
}

impl StepExecutor<Value> for SimulatedExecutor {
    fn execute(&self, work_type: &str, state: &Value) -> Result<Value, StepFailure> {
        match self.steps.get(work_type) {
            Some(step) => step(state),
            None => Ok(Value::Object(Map::new())),
        }
    }
}

impl std::fmt::Debug for SimulatedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedExecutor")
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .finish()
    }
}
