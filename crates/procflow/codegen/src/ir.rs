//! Compiled transition table
//!
//! The compiler lowers a `ProcessModel` into this intermediate form. The
//! renderer writes it out as Rust source; the engine interprets it
//! directly. Both read the same ops, so the generated program and the
//! reference host cannot drift apart.

use serde::{Deserialize, Serialize};

// ── Compiled Process ─────────────────────────────────────────────────

/// Everything generated for one process type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledProcess {
    /// Process name
    pub process: String,
    /// Rust type of the state value
    pub state_type: String,
    /// Every phase, in declaration order
    pub phases: Vec<String>,
    /// Instance fields
    pub fields: Vec<FieldDef>,
    /// Loop exit checks
    pub conditions: Vec<ConditionCheck>,
    /// Every message type, each listed once
    pub messages: Vec<MessageDef>,
    /// Parallel sections and their join targets
    pub forks: Vec<ForkLayout>,
    /// Start factory
    pub start: Transition,
    /// Message-driven transitions in emission order
    pub transitions: Vec<Transition>,
    /// Fallbacks for messages whose instance cannot be found
    pub not_found: Vec<NotFoundFallback>,
}

impl CompiledProcess {
    /// The transition triggered by a message
    pub fn transition_for(&self, message: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.trigger == message)
    }

    pub fn message(&self, name: &str) -> Option<&MessageDef> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Transitions of one kind
    pub fn transitions_of(&self, kind: TransitionKind) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(move |t| t.kind == kind)
    }

    pub fn has_phase(&self, phase: &str) -> bool {
        self.phases.iter().any(|p| p == phase)
    }

    /// The fork a message belongs to, if it drives a step on a parallel path
    pub fn fork_of_message(&self, message: &str) -> Option<&ForkLayout> {
        self.forks
            .iter()
            .find(|f| f.paths.iter().any(|p| p.messages.iter().any(|m| m == message)))
    }

    pub fn fallback_for(&self, kind: MessageKind) -> Option<&NotFoundFallback> {
        self.not_found.iter().find(|f| f.kind == kind)
    }
}

// ── Fields & Conditions ──────────────────────────────────────────────

/// One field of the generated process instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    InstanceId,
    State,
    Phase,
    Finished,
    PendingApproval,
    ApprovalDecision,
    /// Iteration counter for one loop nesting path
    IterationCounter { loop_path: String },
    FailureContext,
}

/// A named loop-exit check bound to a registry condition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionCheck {
    /// Generated check name, e.g. `ShouldExitRefineLoop`
    pub name: String,
    /// Condition identifier resolved at run time
    pub condition_id: String,
    pub loop_path: String,
}

// ── Messages ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDef {
    pub name: String,
    pub kind: MessageKind,
    /// Step phase or approval name the message concerns
    pub subject: String,
}

impl MessageDef {
    pub fn is_command(&self) -> bool {
        self.kind.is_command()
    }
}

/// The payload shape and role of a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageKind {
    StartProcess,
    StartStep,
    ExecuteWorker,
    StepCompleted,
    ValidationFailed,
    ApprovalRequested,
    ApprovalPending,
    ApprovalDecided,
    ApprovalTimedOut,
    FailureTrigger,
}

impl MessageKind {
    pub fn is_command(self) -> bool {
        matches!(
            self,
            MessageKind::StartProcess
                | MessageKind::StartStep
                | MessageKind::ExecuteWorker
                | MessageKind::FailureTrigger
        )
    }

    /// Whether a process instance consumes messages of this kind
    pub fn is_inbound(self) -> bool {
        matches!(
            self,
            MessageKind::StartStep
                | MessageKind::StepCompleted
                | MessageKind::ApprovalPending
                | MessageKind::ApprovalDecided
                | MessageKind::ApprovalTimedOut
                | MessageKind::FailureTrigger
        )
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MessageKind::StartProcess => "start_process",
            MessageKind::StartStep => "start_step",
            MessageKind::ExecuteWorker => "execute_worker",
            MessageKind::StepCompleted => "step_completed",
            MessageKind::ValidationFailed => "validation_failed",
            MessageKind::ApprovalRequested => "approval_requested",
            MessageKind::ApprovalPending => "approval_pending",
            MessageKind::ApprovalDecided => "approval_decided",
            MessageKind::ApprovalTimedOut => "approval_timed_out",
            MessageKind::FailureTrigger => "failure_trigger",
        };
        write!(f, "{}", label)
    }
}

// ── Forks ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkLayout {
    /// Fork id, e.g. `Fork_Gather`
    pub id: String,
    /// Completion event that dispatches every path
    pub trigger: String,
    /// Command released once every path has reported
    pub join_command: String,
    pub fail_fast: bool,
    pub paths: Vec<ForkPathLayout>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkPathLayout {
    /// Step phases of the path, in order
    pub phases: Vec<String>,
    /// Every message driving a step of the path
    pub messages: Vec<String>,
}

// ── Transitions ──────────────────────────────────────────────────────

/// One message-driven transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Generated handler name
    pub name: String,
    pub kind: TransitionKind,
    /// Message that triggers the transition
    pub trigger: String,
    /// Effects, executed in order
    pub body: Vec<Op>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    StartFactory,
    StepStart,
    StepCompleted,
    ApprovalSetPending,
    ApprovalResume,
    ApprovalTimeout,
    FailureTrigger,
}

/// A single effect of a transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Create the instance from the start command
    InitializeInstance,
    SetPhase(String),
    /// Refuse to run the step when its predicate does not hold
    Validate(ValidationGuard),
    /// Hand the step's work to the step executor
    DispatchWork { step: String, command: String },
    /// Merge the completion's update; a step-supplied failure sets `Failed`
    ApplyUpdate,
    RouteFailure(FailureRoute),
    Continue(Continuation),
    Route(BranchRoute),
    /// Start every path of a fork
    Fork { fork: String, commands: Vec<String> },
    /// Report a finished path to its fork's join
    JoinPath(JoinTarget),
    RecordPendingApproval,
    /// Stop unless the message carries the outstanding correlation id
    GuardCorrelation { approval: String },
    ClearPendingApproval,
    RecordDecision,
    /// Act on a decision; deferred decisions keep the request open
    Decide {
        approved: Continuation,
        rejected: Continuation,
    },
    CaptureFailure,
    /// Re-dispatch the step recorded in the failure context
    ResumeFailedStep { targets: Vec<ResumeTarget> },
}

/// Where control goes next
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuation {
    /// Dispatch a step start command
    Send(String),
    Complete,
    Fail,
    Loop(Box<LoopControl>),
    RequestApproval(ApprovalRequest),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationGuard {
    pub step: String,
    pub condition_id: String,
    pub message: String,
    pub event: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRoute {
    /// Phase of the failing step
    pub step: String,
    /// Failure-handler trigger command, when a handler applies
    pub handler: Option<String>,
    /// Set when the step runs on a fork path
    pub fork: Option<ForkFailure>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkFailure {
    pub fork: String,
    pub fail_fast: bool,
    pub join: JoinTarget,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTarget {
    pub fork: String,
    pub path: usize,
    pub of: usize,
    pub command: String,
}

/// Loop completion control, evaluated at the loop's last body step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopControl {
    pub loop_path: String,
    pub counter: String,
    pub check: String,
    pub condition_id: String,
    pub max_iterations: u32,
    /// Taken when the bound is reached or the condition holds
    pub exit: Continuation,
    /// Start command of the first body step
    pub repeat: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRoute {
    pub branch: String,
    pub discriminator: Discriminator,
    pub arms: Vec<RouteArm>,
    /// Catch-all target; absent makes an unmatched value a fatal error
    pub otherwise: Option<Continuation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discriminator {
    /// Dotted path into the state
    pub field_path: String,
    pub type_name: String,
    pub enumerated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteArm {
    pub value: String,
    pub target: Continuation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub approval: String,
    pub approver_type: String,
    pub event: String,
    pub phase: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeTarget {
    /// Phase recorded as the failed step
    pub step: String,
    pub command: String,
}

// ── Not Found ────────────────────────────────────────────────────────

/// Fallback for one inbound message kind whose instance has vanished
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFoundFallback {
    pub kind: MessageKind,
    /// Messages of this kind, in declaration order
    pub messages: Vec<String>,
}
