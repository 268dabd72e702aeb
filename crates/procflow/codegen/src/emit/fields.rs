//! Process-instance fields

use crate::context::EmissionContext;
use crate::ir::{FieldDef, FieldKind};
use crate::naming;

/// Fields carried by every instance of the process
///
/// Approval and failure-context fields only appear when the model uses
/// them; there is one iteration counter per loop nesting path.
pub fn emit(ctx: &EmissionContext<'_>) -> Vec<FieldDef> {
    let model = ctx.model();
    let mut fields = vec![
        field("instance_id", FieldKind::InstanceId),
        field("state", FieldKind::State),
        field("phase", FieldKind::Phase),
        field("is_finished", FieldKind::Finished),
    ];

    if model.has_approvals() {
        fields.push(field("pending_approval_id", FieldKind::PendingApproval));
        fields.push(field("last_approval_decision", FieldKind::ApprovalDecision));
    }

    for looped in &model.loops {
        let chain = ctx.loop_chain_names(looped);
        fields.push(field(
            &naming::iteration_counter(&chain),
            FieldKind::IterationCounter {
                loop_path: naming::loop_path(&chain),
            },
        ));
    }

    if model.has_failure_handlers() {
        fields.push(field("failure_context", FieldKind::FailureContext));
    }
    fields
}

fn field(name: &str, kind: FieldKind) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        kind,
    }
}
