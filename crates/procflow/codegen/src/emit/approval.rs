//! Approval gate transitions
//!
//! A gate is requested at its preceding step's completion and then driven
//! by three events: the pending acknowledgement carrying the correlation
//! id, the human decision, and the timeout. Decision and timeout both
//! guard on the correlation id, so whichever arrives second is a no-op.

use crate::context::EmissionContext;
use crate::ir::{ApprovalRequest, Continuation, Op, Transition, TransitionKind};
use crate::naming;
use procflow_model::{ApprovalModel, Escalation};

/// Request the approval and park the instance in its await phase
pub fn emit_request(approval: &ApprovalModel) -> Continuation {
    Continuation::RequestApproval(ApprovalRequest {
        approval: approval.name.clone(),
        approver_type: approval.approver_type.clone(),
        event: naming::approval_requested_event(&approval.name),
        phase: naming::await_approval_phase(&approval.name),
    })
}

/// Set-pending, resume and timeout transitions of one gate
pub fn emit(
    ctx: &EmissionContext<'_>,
    approval: &ApprovalModel,
    continuation: &Continuation,
) -> Vec<Transition> {
    let pending = naming::approval_pending_event(&approval.name);
    let decided = naming::approval_decided_event(&approval.name);
    let timed_out = naming::approval_timed_out_event(&approval.name);

    let transitions = vec![
        Transition {
            name: naming::handler_name(&pending),
            kind: TransitionKind::ApprovalSetPending,
            trigger: pending,
            body: vec![Op::RecordPendingApproval],
        },
        Transition {
            name: naming::handler_name(&decided),
            kind: TransitionKind::ApprovalResume,
            trigger: decided,
            body: vec![
                Op::GuardCorrelation {
                    approval: approval.name.clone(),
                },
                Op::RecordDecision,
                Op::Decide {
                    approved: continuation.clone(),
                    rejected: rejection(approval),
                },
            ],
        },
        Transition {
            name: naming::handler_name(&timed_out),
            kind: TransitionKind::ApprovalTimeout,
            trigger: timed_out,
            body: vec![
                Op::GuardCorrelation {
                    approval: approval.name.clone(),
                },
                Op::ClearPendingApproval,
                Op::Continue(escalation(approval)),
            ],
        },
    ];

    tracing::debug!(
        process = %ctx.process_name(),
        approval = %approval.name,
        terminal = approval.is_escalation_terminal(),
        "Emitted approval gate"
    );
    transitions
}

/// Rejections run the rejection chain, or fail the process without one
fn rejection(approval: &ApprovalModel) -> Continuation {
    match approval.rejection_steps.first() {
        Some(first) => Continuation::Send(naming::start_command(&naming::rejection_step_phase(
            &approval.name,
            first.identifier(),
        ))),
        None => Continuation::Fail,
    }
}

/// Timeouts escalate to more steps or a further approval, or fail
fn escalation(approval: &ApprovalModel) -> Continuation {
    match &approval.escalation {
        Some(Escalation::Steps(steps)) => match steps.first() {
            Some(first) => Continuation::Send(naming::start_command(
                &naming::escalation_step_phase(&approval.name, first.identifier()),
            )),
            None => Continuation::Fail,
        },
        Some(Escalation::Approval(nested)) => emit_request(nested),
        None => Continuation::Fail,
    }
}
