//! Loop-exit condition checks

use crate::context::EmissionContext;
use crate::ir::ConditionCheck;
use crate::naming;

/// One exit check per loop nesting path, bound to the loop's condition id
pub fn emit(ctx: &EmissionContext<'_>) -> Vec<ConditionCheck> {
    ctx.model()
        .loops
        .iter()
        .map(|looped| {
            let chain = ctx.loop_chain_names(looped);
            ConditionCheck {
                name: naming::exit_check(&chain),
                condition_id: looped.condition_id.clone(),
                loop_path: naming::loop_path(&chain),
            }
        })
        .collect()
}
