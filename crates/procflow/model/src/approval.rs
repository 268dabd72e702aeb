//! Approval gates: human-latency pauses with escalation and rejection paths
//!
//! An approval suspends the process after its preceding step until a
//! decision or a timeout arrives. A timeout escalates either by running
//! more steps or by requesting a second, different approval; the two
//! are mutually exclusive, which `Escalation` encodes directly.

use crate::StepModel;
use serde::{Deserialize, Serialize};

/// A human approval point
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalModel {
    /// Approval point name
    pub name: String,
    /// Type of the approver being asked
    pub approver_type: String,
    /// Step whose completion requests the approval
    pub preceding_step: String,
    /// What a timeout escalates to; absent means a timeout fails the process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation: Option<Escalation>,
    /// Steps run when the approval is rejected
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejection_steps: Vec<StepModel>,
}

impl ApprovalModel {
    pub fn new(
        name: impl Into<String>,
        approver_type: impl Into<String>,
        preceding_step: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            approver_type: approver_type.into(),
            preceding_step: preceding_step.into(),
            escalation: None,
            rejection_steps: Vec::new(),
        }
    }

    /// Escalate a timeout by running the given steps
    pub fn escalate_with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StepModel>,
    {
        self.escalation = Some(Escalation::Steps(
            steps.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Escalate a timeout by requesting a further approval
    pub fn escalate_to(mut self, approval: ApprovalModel) -> Self {
        self.escalation = Some(Escalation::Approval(Box::new(approval)));
        self
    }

    pub fn on_rejection<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StepModel>,
    {
        self.rejection_steps = steps.into_iter().map(Into::into).collect();
        self
    }

    /// No further escalation path: a timeout fails the process
    pub fn is_escalation_terminal(&self) -> bool {
        self.escalation.is_none()
    }

    pub fn escalation_steps(&self) -> &[StepModel] {
        match &self.escalation {
            Some(Escalation::Steps(steps)) => steps,
            _ => &[],
        }
    }

    pub fn nested_approval(&self) -> Option<&ApprovalModel> {
        match &self.escalation {
            Some(Escalation::Approval(approval)) => Some(approval),
            _ => None,
        }
    }

    /// This approval followed by every nested escalation approval, outermost first
    pub fn chain(&self) -> Vec<&ApprovalModel> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(next) = current.nested_approval() {
            chain.push(next);
            current = next;
        }
        chain
    }
}

/// The escalation taken when an approval times out
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Escalation {
    Steps(Vec<StepModel>),
    Approval(Box<ApprovalModel>),
}
