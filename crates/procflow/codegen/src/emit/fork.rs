//! Fork cascade and join layout
//!
//! The compiler's part of a fork is small: dispatch one start command per
//! path and report each finished path to the join. Counting the reports
//! and releasing the join step once is left to the host.

use crate::context::EmissionContext;
use crate::ir::{ForkLayout, ForkPathLayout, Op};
use crate::naming;
use procflow_model::ForkModel;

/// Dispatch the first step of every path
pub fn emit_cascade(fork: &ForkModel) -> Op {
    Op::Fork {
        fork: naming::fork_id(&fork.previous_step),
        commands: fork
            .paths
            .iter()
            .filter_map(|path| path.steps.first())
            .map(|step| naming::start_command(step.identifier()))
            .collect(),
    }
}

/// Path membership and join target of a fork, for the host's bookkeeping
pub fn layout<'m>(ctx: &EmissionContext<'m>, fork: &'m ForkModel) -> ForkLayout {
    let mut paths: Vec<ForkPathLayout> = fork
        .paths
        .iter()
        .map(|_| ForkPathLayout {
            phases: Vec::new(),
            messages: Vec::new(),
        })
        .collect();

    for site in ctx.fork_paths(fork) {
        let Some(path) = site
            .fork_path
            .as_ref()
            .and_then(|f| paths.get_mut(f.join.path))
        else {
            continue;
        };
        path.phases.push(site.phase.clone());
        path.messages.push(site.start_command());
        path.messages.push(site.worker_command());
        path.messages.push(site.completed_event());
        if site.step.is_validated() {
            path.messages.push(site.validation_failed_event());
        }
    }

    ForkLayout {
        id: naming::fork_id(&fork.previous_step),
        trigger: naming::completed_event(&fork.previous_step),
        join_command: naming::start_command(&fork.join_step),
        fail_fast: fork.fail_fast,
        paths,
    }
}
