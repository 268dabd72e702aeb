//! Run-time contract
//!
//! The types and collaborator traits a compiled process links against.
//! Generated source imports these by path; the reference host uses the
//! same definitions, so both agree on every payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifies one process instance
pub type InstanceId = Uuid;

/// Identifies one outstanding approval request
pub type CorrelationId = Uuid;

// ── Collaborators ────────────────────────────────────────────────────

/// Merges a partial update into the current state
pub trait StateReducer<S> {
    fn reduce(&self, current: &S, update: S) -> S;
}

/// Evaluates named predicates against state
pub trait ConditionRegistry<S> {
    fn evaluate(&self, condition_id: &str, state: &S) -> bool;
}

/// Runs the work of one step
///
/// Returns the state fragment the step produced, or the failure that
/// stopped it. Cancellation of in-flight work belongs to the implementor.
pub trait StepExecutor<S> {
    fn execute(&self, work_type: &str, state: &S) -> Result<S, StepFailure>;
}

/// Collaborators available to every transition
pub struct Collaborators<'a, S> {
    pub reducer: &'a dyn StateReducer<S>,
    pub conditions: &'a dyn ConditionRegistry<S>,
}

impl<'a, S> Collaborators<'a, S> {
    pub fn new(
        reducer: &'a dyn StateReducer<S>,
        conditions: &'a dyn ConditionRegistry<S>,
    ) -> Self {
        Self {
            reducer,
            conditions,
        }
    }
}

// ── Outbound ─────────────────────────────────────────────────────────

/// One effect a transition hands back to the host, in emission order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Outbound<M> {
    /// Deliver a message
    Send(M),
    /// Report a finished fork path; the host releases `message` once all
    /// `of` paths have reported
    Join {
        fork: String,
        path: usize,
        of: usize,
        message: M,
    },
    /// Stop the sibling paths of a fail-fast fork
    CancelFork { fork: String },
}

// ── Approvals ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalDecision {
    Approved,
    Rejected,
    /// Recorded, but the request stays open
    Deferred,
}

impl std::fmt::Display for ApprovalDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Deferred => write!(f, "deferred"),
        }
    }
}

// ── Failures ─────────────────────────────────────────────────────────

/// Failure reported by a step executor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub message: String,
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

impl StepFailure {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: error_type.into(),
            stack_trace: None,
        }
    }

    pub fn with_stack_trace(mut self, trace: impl Into<String>) -> Self {
        self.stack_trace = Some(trace.into());
        self
    }
}

/// What a recovery chain knows about the failure that started it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    /// Phase of the step that failed
    pub failed_step: String,
    pub message: String,
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl FailureContext {
    pub fn capture(step: &str, failure: &StepFailure) -> Self {
        Self {
            failed_step: step.to_string(),
            message: failure.message.clone(),
            error_type: failure.error_type.clone(),
            stack_trace: failure.stack_trace.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Errors a transition can raise
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessError {
    /// A step failed with no failure handler or fork to absorb it
    #[error("Step '{step}' failed: {}", failure.message)]
    StepFailed { step: String, failure: StepFailure },

    /// A discriminator value matched no case and the branch has no otherwise
    #[error("Branch '{branch}' has no case for value '{value}'")]
    UnmatchedBranch { branch: String, value: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("No transition handles message '{0}'")]
    UnexpectedMessage(String),
}

// ── Not Found ────────────────────────────────────────────────────────

/// Record of a message whose instance no longer exists
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFound {
    /// Message kind, e.g. `step_completed`
    pub kind: String,
    pub message: String,
    pub instance_id: InstanceId,
    pub recorded_at: DateTime<Utc>,
}

impl NotFound {
    pub fn new(kind: impl Into<String>, message: impl Into<String>, instance_id: InstanceId) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            instance_id,
            recorded_at: Utc::now(),
        }
    }
}

// ── Discriminators ───────────────────────────────────────────────────

/// The value at a dotted path of the state, as routing text
///
/// Strings route by their content, unit enum variants by their name and
/// anything else by its JSON form. A missing field routes as the empty string.
pub fn discriminator_value<S: Serialize>(state: &S, field_path: &str) -> String {
    let Ok(value) = serde_json::to_value(state) else {
        return String::new();
    };
    let found = field_path
        .split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(&value, |current, segment| current.get(segment));
    match found {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
