//! Failure-handler chains
//!
//! A failing step hands its failure to the trigger command of whichever
//! handler applies. The trigger captures the failure context and starts
//! the recovery chain. A terminal chain fails the process when it ends;
//! a non-terminal one re-dispatches the step that failed.

use crate::context::{Emission, EmissionContext, HandlerContext, SiteOrigin};
use crate::error::{CodegenError, CodegenResult};
use crate::ir::{Continuation, FailureRoute, Op, ResumeTarget, Transition, TransitionKind};
use crate::naming;
use procflow_model::FailureHandlerModel;

/// Failure routing for a step's completion
pub fn route(hc: &HandlerContext<'_>) -> FailureRoute {
    FailureRoute {
        step: hc.phase.clone(),
        handler: hc
            .failure_handler
            .map(|handler| naming::failure_trigger_command(&handler.id)),
        fork: hc.fork_path.clone(),
    }
}

/// The transition capturing a failure and entering the recovery chain
pub fn emit_trigger(handler: &FailureHandlerModel) -> CodegenResult<Transition> {
    let first = handler.steps.first().ok_or_else(|| {
        CodegenError::Generation(format!("failure handler '{}' has no steps", handler.id))
    })?;
    let trigger = naming::failure_trigger_command(&handler.id);
    Ok(Transition {
        name: naming::handler_name(&trigger),
        kind: TransitionKind::FailureTrigger,
        trigger,
        body: vec![
            Op::CaptureFailure,
            Op::Continue(Continuation::Send(naming::start_command(
                &naming::failure_handler_step(&handler.id, first.identifier()),
            ))),
        ],
    })
}

/// What the last recovery step does on completion
pub fn emit_chain_end(ctx: &EmissionContext<'_>, handler: &FailureHandlerModel) -> Op {
    if handler.is_terminal {
        return Op::Continue(Continuation::Fail);
    }

    // Every step this handler can be triggered from is a resumption target.
    let targets = ctx
        .plan()
        .iter()
        .filter_map(|emission| match emission {
            Emission::Step(hc) if hc.origin != SiteOrigin::Recovery => Some(hc),
            _ => None,
        })
        .filter(|hc| hc.failure_handler.is_some_and(|h| std::ptr::eq(h, handler)))
        .map(|hc| ResumeTarget {
            step: hc.phase.clone(),
            command: hc.start_command(),
        })
        .collect();
    Op::ResumeFailedStep { targets }
}
