//! Error types for the process model

/// Errors raised while constructing or validating a process model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Process must have at least one step")]
    EmptyProcess,

    #[error("Invalid identifier '{0}': expected a letter or '_' followed by letters, digits or '_'")]
    InvalidIdentifier(String),

    #[error("Duplicate step '{step}' in {scope}")]
    DuplicateStep { scope: String, step: String },

    #[error("{construct} references unknown step '{step}'")]
    UnknownStep { construct: String, step: String },

    #[error("Loop '{0}' must allow at least one iteration")]
    InvalidLoopBound(String),

    #[error("Loop '{0}' ends before it starts")]
    InvertedLoopBody(String),

    #[error("Duplicate loop path: {0}")]
    DuplicateLoop(String),

    #[error("Loop '{loop_name}' references unknown parent loop '{parent}'")]
    UnknownParentLoop { loop_name: String, parent: String },

    #[error("Parent loop name '{0}' is ambiguous")]
    AmbiguousParentLoop(String),

    #[error("Loop '{0}' is its own ancestor")]
    CyclicLoopNesting(String),

    #[error("Loop '{loop_name}' is not contained in the body of its parent '{parent}'")]
    LoopOutsideParent { loop_name: String, parent: String },

    #[error("Loops '{first}' and '{second}' overlap without being nested")]
    OverlappingLoops { first: String, second: String },

    #[error("Loops '{first}' and '{second}' share last body step '{step}' but are not stacked")]
    SharedLoopEnd {
        first: String,
        second: String,
        step: String,
    },

    #[error("Branch '{0}' has no cases")]
    EmptyBranch(String),

    #[error("Branch '{0}' declares more than one otherwise case")]
    MultipleOtherwise(String),

    #[error("Branch '{branch}' declares case value '{value}' more than once")]
    DuplicateCaseValue { branch: String, value: String },

    #[error("Branch '{branch}' case '{value}' is not part of the discriminator domain")]
    UnknownCaseValue { branch: String, value: String },

    #[error("Branch '{branch}' does not cover discriminator values: {missing:?}")]
    NonExhaustiveBranch { branch: String, missing: Vec<String> },

    #[error("Branch '{branch}' has loop prefix '{prefix}' but its enclosing loops are '{expected}'")]
    LoopPrefixMismatch {
        branch: String,
        prefix: String,
        expected: String,
    },

    #[error("Duplicate branch id: {0}")]
    DuplicateBranch(String),

    #[error("Duplicate approval name: {0}")]
    DuplicateApproval(String),

    #[error("Fork after '{0}' needs at least two paths")]
    TooFewForkPaths(String),

    #[error("Fork after '{step}' has an empty path at index {path}")]
    EmptyForkPath { step: String, path: usize },

    #[error("Failure handler '{0}' has no recovery steps")]
    EmptyRecoveryChain(String),

    #[error("Failure handler id must not be empty")]
    EmptyHandlerId,

    #[error("Duplicate failure handler for {0}")]
    DuplicateHandler(String),

    #[error("Failure handler '{handler}' resumes failed steps inside fail-fast fork '{fork}', whose cancelled paths can never join")]
    ResumeInFailFastFork { fork: String, handler: String },

    #[error("Step '{step}' carries conflicting control attachments: {first} and {second}")]
    ConflictingAttachments {
        step: String,
        first: String,
        second: String,
    },
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;
