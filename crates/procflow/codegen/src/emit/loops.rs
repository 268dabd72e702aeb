//! Loop completion control
//!
//! Emitted at a loop's last body step. The counter is advanced first and
//! the bound checked before the condition, so a loop with bound M runs
//! its body at most M times whatever the condition registry says.

use crate::context::EmissionContext;
use crate::ir::{Continuation, LoopControl};
use crate::naming;
use procflow_model::LoopModel;

/// Control for the loops ending at one step, innermost first
///
/// An inner loop without a continuation hands over to the next loop
/// stacked on the same step; the outermost one falls back to completing
/// the process.
pub fn emit_control(ctx: &EmissionContext<'_>, stacked: &[&LoopModel]) -> Continuation {
    let Some((looped, outer)) = stacked.split_first() else {
        return Continuation::Complete;
    };
    let chain = ctx.loop_chain_names(looped);

    let exit = match &looped.continuation_step {
        Some(step) => Continuation::Send(ctx.main_start_command(step)),
        None if !outer.is_empty() => emit_control(ctx, outer),
        None => Continuation::Complete,
    };

    Continuation::Loop(Box::new(LoopControl {
        loop_path: naming::loop_path(&chain),
        counter: naming::iteration_counter(&chain),
        check: naming::exit_check(&chain),
        condition_id: looped.condition_id.clone(),
        max_iterations: looped.max_iterations,
        exit,
        repeat: ctx.main_start_command(&looped.first_body_step),
    }))
}
