//! Process-start factory

use crate::context::EmissionContext;
use crate::error::{CodegenError, CodegenResult};
use crate::ir::{Continuation, Op, Transition, TransitionKind};
use crate::naming;

/// The factory creating an instance and dispatching the first step
pub fn emit(ctx: &EmissionContext<'_>) -> CodegenResult<Transition> {
    let first = ctx
        .model()
        .first_step()
        .ok_or_else(|| CodegenError::Generation("process has no first step".into()))?;
    Ok(Transition {
        name: "start".into(),
        kind: TransitionKind::StartFactory,
        trigger: naming::process_start_command(ctx.process_name()),
        body: vec![
            Op::InitializeInstance,
            Op::Continue(Continuation::Send(ctx.main_start_command(first.identifier()))),
        ],
    })
}
