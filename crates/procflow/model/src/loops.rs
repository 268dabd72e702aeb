//! Bounded loops over a contiguous run of main-line steps
//!
//! A loop repeats its body until a named condition holds or the
//! iteration bound is reached, whichever comes first. Loops may nest;
//! a nested loop names its parent so that counters and condition checks
//! can be derived from the full nesting path.

use serde::{Deserialize, Serialize};

/// A bounded loop attached to the main line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopModel {
    /// Loop name, unique among its siblings
    pub name: String,
    /// Exit condition identifier resolved through the condition registry
    pub condition_id: String,
    /// Hard upper bound on traversals of the body
    pub max_iterations: u32,
    /// First step of the body
    pub first_body_step: String,
    /// Last step of the body, where the exit decision is taken
    pub last_body_step: String,
    /// Step started when the loop exits; absent ends the process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_step: Option<String>,
    /// Enclosing loop, if nested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_loop: Option<String>,
}

impl LoopModel {
    pub fn new(
        name: impl Into<String>,
        condition_id: impl Into<String>,
        max_iterations: u32,
        first_body_step: impl Into<String>,
        last_body_step: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            condition_id: condition_id.into(),
            max_iterations,
            first_body_step: first_body_step.into(),
            last_body_step: last_body_step.into(),
            continuation_step: None,
            parent_loop: None,
        }
    }

    pub fn with_continuation(mut self, step: impl Into<String>) -> Self {
        self.continuation_step = Some(step.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_loop = Some(parent.into());
        self
    }

    pub fn is_nested(&self) -> bool {
        self.parent_loop.is_some()
    }

    /// Whether exiting the loop ends the whole process
    pub fn exits_process(&self) -> bool {
        self.continuation_step.is_none()
    }
}
