//! Host error types.

use crate::contract::{InstanceId, ProcessError};
use procflow_codegen::CodegenError;
use thiserror::Error;

/// Errors raised by the reference host.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The process model could not be compiled.
    #[error("Compilation failed: {0}")]
    Compile(#[from] CodegenError),

    /// A transition raised an error.
    #[error("Transition failed: {0}")]
    Process(#[from] ProcessError),

    #[error("Unknown instance: {0}")]
    UnknownInstance(InstanceId),

    /// No approval request was ever recorded for this gate.
    #[error("Instance {instance_id} has no request for approval '{approval}'")]
    NoApprovalRequest {
        instance_id: InstanceId,
        approval: String,
    },

    /// A message arrived with a payload its transition cannot read.
    #[error("Message '{message}' carries the wrong payload, expected {expected}")]
    UnexpectedBody { message: String, expected: String },

    /// The queue did not drain within the delivery limit.
    #[error("Delivery limit of {0} messages reached")]
    DeliveryLimit(usize),
}

/// Result type for host operations.
pub type EngineResult<T> = Result<T, EngineError>;
