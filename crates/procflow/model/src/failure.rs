//! Failure handlers: recovery chains run when a step fails

use crate::StepModel;
use serde::{Deserialize, Serialize};

/// A recovery chain bound to the whole process or to one step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureHandlerModel {
    /// Handler id; non-identifier characters are sanitised when naming
    pub id: String,
    /// Where the handler applies
    pub scope: HandlerScope,
    /// Recovery steps, in order
    pub steps: Vec<StepModel>,
    /// Terminal chains end the process as failed
    pub is_terminal: bool,
}

impl FailureHandlerModel {
    /// A handler reachable from any step
    pub fn workflow(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope: HandlerScope::Workflow,
            steps: Vec::new(),
            is_terminal: false,
        }
    }

    /// A handler bound to one triggering step
    pub fn for_step(id: impl Into<String>, trigger_step: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope: HandlerScope::Step(trigger_step.into()),
            steps: Vec::new(),
            is_terminal: false,
        }
    }

    pub fn step(mut self, step: impl Into<StepModel>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn terminal(mut self) -> Self {
        self.is_terminal = true;
        self
    }

    pub fn trigger_step(&self) -> Option<&str> {
        match &self.scope {
            HandlerScope::Step(step) => Some(step),
            HandlerScope::Workflow => None,
        }
    }

    /// Whether a failure of `step` is handled here
    pub fn applies_to(&self, step: &str) -> bool {
        match &self.scope {
            HandlerScope::Workflow => true,
            HandlerScope::Step(trigger) => trigger == step,
        }
    }
}

/// The reach of a failure handler
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerScope {
    Workflow,
    Step(String),
}
