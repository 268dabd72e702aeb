//! Dynamic messages carried by the reference host

use crate::contract::{ApprovalDecision, CorrelationId, FailureContext, InstanceId, StepFailure};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named command or event addressed to one instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Generated message name, e.g. `StartChargeCommand`
    pub name: String,
    pub instance_id: InstanceId,
    pub body: MessageBody,
}

/// Payload, one shape per message kind
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MessageBody {
    Start { state: Value },
    Empty,
    Work { step: String, state: Value },
    Completed {
        update: Value,
        failure: Option<StepFailure>,
    },
    ValidationFailed { step: String, message: String },
    ApprovalRequested { approval: String, approver_type: String },
    ApprovalPending { correlation_id: CorrelationId },
    ApprovalDecided {
        correlation_id: CorrelationId,
        decision: ApprovalDecision,
    },
    ApprovalTimedOut { correlation_id: CorrelationId },
    FailureTrigger { failure: FailureContext },
}

impl Message {
    pub fn new(name: impl Into<String>, instance_id: InstanceId, body: MessageBody) -> Self {
        Self {
            name: name.into(),
            instance_id,
            body,
        }
    }

    /// A command with no payload beyond the instance id
    pub fn command(name: impl Into<String>, instance_id: InstanceId) -> Self {
        Self::new(name, instance_id, MessageBody::Empty)
    }

    /// The correlation id of an approval signal
    pub fn correlation_id(&self) -> Option<CorrelationId> {
        match &self.body {
            MessageBody::ApprovalPending { correlation_id }
            | MessageBody::ApprovalDecided { correlation_id, .. }
            | MessageBody::ApprovalTimedOut { correlation_id } => Some(*correlation_id),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        match &self.body {
            MessageBody::Completed { failure, .. } => failure.as_ref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.name, self.instance_id)
    }
}
