//! Process models: the immutable blueprint a compiler consumes
//!
//! A ProcessModel is an ordered main line of steps plus optional
//! attachments (loops, branches, approvals, forks, failure handlers)
//! keyed to specific main-line steps. Models are assembled once through
//! `ProcessBuilder`, validated, and never mutated afterwards.

use crate::{
    validator, ApprovalModel, BranchModel, FailureHandlerModel, ForkModel, HandlerScope,
    LoopModel, ModelResult, StepModel,
};
use serde::{Deserialize, Serialize};

// ── Process Model ────────────────────────────────────────────────────

/// A complete, validated process definition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessModel {
    /// Process name, used as the prefix of generated types
    pub name: String,
    /// Main-line steps, in execution order
    pub steps: Vec<StepModel>,
    /// Name of the state shape carried by every instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loops: Vec<LoopModel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<BranchModel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub approvals: Vec<ApprovalModel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forks: Vec<ForkModel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_handlers: Vec<FailureHandlerModel>,
}

impl ProcessModel {
    /// Start building a process
    pub fn builder(name: impl Into<String>) -> ProcessBuilder {
        ProcessBuilder::new(name)
    }

    /// Validate the model for structural correctness
    pub fn validate(&self) -> ModelResult<()> {
        validator::validate(self)
    }

    /// Main-line step identifiers, in order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(StepModel::identifier).collect()
    }

    /// Get a main-line step by identifier
    pub fn step(&self, name: &str) -> Option<&StepModel> {
        self.steps.iter().find(|s| s.identifier() == name)
    }

    /// Position of a main-line step
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.identifier() == name)
    }

    /// The main-line step following `name`
    pub fn successor(&self, name: &str) -> Option<&StepModel> {
        self.index_of(name).and_then(|i| self.steps.get(i + 1))
    }

    pub fn first_step(&self) -> Option<&StepModel> {
        self.steps.first()
    }

    pub fn last_step(&self) -> Option<&StepModel> {
        self.steps.last()
    }

    /// Resolve a loop's parent by name
    pub fn parent_of(&self, looped: &LoopModel) -> Option<&LoopModel> {
        let parent = looped.parent_loop.as_deref()?;
        self.loops.iter().find(|l| l.name == parent)
    }

    /// The nesting chain of a loop, outermost first and ending with the loop itself
    pub fn loop_chain<'a>(&'a self, looped: &'a LoopModel) -> Vec<&'a LoopModel> {
        let mut chain = vec![looped];
        let mut current = looped;
        while let Some(parent) = self.parent_of(current) {
            // Validated models are acyclic; the bound guards unvalidated ones.
            if chain.len() > self.loops.len() {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Loops whose body contains the main-line step, outermost first
    pub fn enclosing_loops(&self, name: &str) -> Vec<&LoopModel> {
        let Some(index) = self.index_of(name) else {
            return Vec::new();
        };
        let mut loops: Vec<&LoopModel> = self
            .loops
            .iter()
            .filter(|l| {
                matches!(self.loop_range(l), Some((first, last)) if first <= index && index <= last)
            })
            .collect();
        loops.sort_by_key(|l| self.loop_chain(l).len());
        loops
    }

    /// Inclusive main-line index range covered by a loop body
    pub fn loop_range(&self, looped: &LoopModel) -> Option<(usize, usize)> {
        Some((
            self.index_of(&looped.first_body_step)?,
            self.index_of(&looped.last_body_step)?,
        ))
    }

    /// The handler a failure of `step` routes to: a step-scoped handler
    /// takes precedence over the workflow-scoped one.
    pub fn failure_handler_for(&self, step: &str) -> Option<&FailureHandlerModel> {
        self.failure_handlers
            .iter()
            .find(|h| h.trigger_step() == Some(step))
            .or_else(|| {
                self.failure_handlers
                    .iter()
                    .find(|h| h.scope == HandlerScope::Workflow)
            })
    }

    pub fn has_failure_handlers(&self) -> bool {
        !self.failure_handlers.is_empty()
    }

    pub fn has_approvals(&self) -> bool {
        !self.approvals.is_empty()
    }
}

// ── Process Builder ──────────────────────────────────────────────────

/// Explicit builder producing an immutable, validated `ProcessModel`
#[derive(Clone, Debug)]
pub struct ProcessBuilder {
    model: ProcessModel,
}

impl ProcessBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            model: ProcessModel {
                name: name.into(),
                steps: Vec::new(),
                state_type: None,
                loops: Vec::new(),
                branches: Vec::new(),
                approvals: Vec::new(),
                forks: Vec::new(),
                failure_handlers: Vec::new(),
            },
        }
    }

    pub fn state_type(mut self, state_type: impl Into<String>) -> Self {
        self.model.state_type = Some(state_type.into());
        self
    }

    /// Append a main-line step
    pub fn step(mut self, step: impl Into<StepModel>) -> Self {
        self.model.steps.push(step.into());
        self
    }

    /// Append several main-line steps
    pub fn steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StepModel>,
    {
        self.model.steps.extend(steps.into_iter().map(Into::into));
        self
    }

    pub fn add_loop(mut self, looped: LoopModel) -> Self {
        self.model.loops.push(looped);
        self
    }

    pub fn add_branch(mut self, branch: BranchModel) -> Self {
        self.model.branches.push(branch);
        self
    }

    pub fn add_approval(mut self, approval: ApprovalModel) -> Self {
        self.model.approvals.push(approval);
        self
    }

    pub fn add_fork(mut self, fork: ForkModel) -> Self {
        self.model.forks.push(fork);
        self
    }

    pub fn add_failure_handler(mut self, handler: FailureHandlerModel) -> Self {
        self.model.failure_handlers.push(handler);
        self
    }

    /// Validate and freeze the model
    pub fn build(self) -> ModelResult<ProcessModel> {
        self.model.validate()?;
        Ok(self.model)
    }
}
