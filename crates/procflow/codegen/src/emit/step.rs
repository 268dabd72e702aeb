//! Step start and completion transitions
//!
//! Every step occurrence, wherever it lives, compiles to the same pair:
//! a start transition that validates and dispatches work, and a
//! completion transition that merges the update and decides what runs
//! next. The decision consults the step's attachments in a fixed
//! priority order.

use crate::context::{EmissionContext, HandlerContext, SequenceEnd};
use crate::emit::{approval, branch, failure, fork, loops};
use crate::ir::{Continuation, Op, Transition, TransitionKind, ValidationGuard};
use crate::naming;

/// Start and completion transitions for one step
pub fn emit(ctx: &EmissionContext<'_>, hc: &HandlerContext<'_>) -> Vec<Transition> {
    let start = emit_start(hc);
    let completed = emit_completed(ctx, hc);
    tracing::debug!(
        process = %ctx.process_name(),
        phase = %hc.phase,
        origin = %hc.origin,
        "Emitted step transitions"
    );
    vec![start, completed]
}

fn emit_start(hc: &HandlerContext<'_>) -> Transition {
    let trigger = hc.start_command();
    let mut body = vec![Op::SetPhase(hc.phase.clone())];
    if let Some(validation) = &hc.step.validation {
        body.push(Op::Validate(ValidationGuard {
            step: hc.phase.clone(),
            condition_id: validation.condition_id.clone(),
            message: validation.message.clone(),
            event: hc.validation_failed_event(),
        }));
    }
    body.push(Op::DispatchWork {
        step: hc.step.work_type.clone(),
        command: hc.worker_command(),
    });

    Transition {
        name: naming::handler_name(&trigger),
        kind: TransitionKind::StepStart,
        trigger,
        body,
    }
}

fn emit_completed(ctx: &EmissionContext<'_>, hc: &HandlerContext<'_>) -> Transition {
    let trigger = hc.completed_event();
    Transition {
        name: naming::handler_name(&trigger),
        kind: TransitionKind::StepCompleted,
        trigger,
        body: vec![
            Op::ApplyUpdate,
            Op::RouteFailure(failure::route(hc)),
            next(ctx, hc),
        ],
    }
}

/// Decide what follows a completed step
fn next(ctx: &EmissionContext<'_>, hc: &HandlerContext<'_>) -> Op {
    if !hc.loops.is_empty() {
        return Op::Continue(loops::emit_control(ctx, &hc.loops));
    }
    if let Some(routed) = hc.branch {
        return branch::emit_route(routed);
    }
    if let Some(end) = hc.path_end {
        return Op::Continue(branch::emit_path_end(end));
    }
    if let Some(gate) = hc.approval {
        return Op::Continue(approval::emit_request(gate));
    }
    if let Some(forked) = hc.fork {
        return fork::emit_cascade(forked);
    }
    if let Some(next) = &hc.next {
        return Op::Continue(Continuation::Send(naming::start_command(next)));
    }
    match &hc.end {
        SequenceEnd::Complete => Op::Continue(Continuation::Complete),
        SequenceEnd::PathEnd(end) => Op::Continue(branch::emit_path_end(*end)),
        SequenceEnd::Join(target) => Op::JoinPath(target.clone()),
        SequenceEnd::Continue(continuation) => Op::Continue(continuation.clone()),
        SequenceEnd::Recovery(handler) => failure::emit_chain_end(ctx, handler),
    }
}
