//! Branch routing and path ends

use crate::context::PathEnd;
use crate::ir::{BranchRoute, Continuation, Discriminator, Op, RouteArm};
use crate::naming;
use procflow_model::{BranchCaseModel, BranchModel};

/// Routing emitted at the step preceding a branch
///
/// Every literal case gets an arm; the otherwise case, if any, catches
/// the rest. Without one an unmatched value is a fatal error at run time.
pub fn emit_route(branch: &BranchModel) -> Op {
    let arms = branch
        .literal_cases()
        .map(|(value, case)| RouteArm {
            value: value.to_string(),
            target: case_entry(branch, case),
        })
        .collect();

    Op::Route(BranchRoute {
        branch: branch.id.clone(),
        discriminator: Discriminator {
            field_path: branch.discriminator.field_path.clone(),
            type_name: branch.discriminator.type_name.clone(),
            enumerated: branch.discriminator.is_enumerated(),
        },
        arms,
        otherwise: branch.otherwise().map(|case| case_entry(branch, case)),
    })
}

/// Where control goes after the last step of a path
pub fn emit_path_end(end: PathEnd<'_>) -> Continuation {
    if end.case.is_terminal {
        return Continuation::Complete;
    }
    match &end.branch.rejoin_step {
        Some(rejoin) => Continuation::Send(naming::start_command(rejoin)),
        None => Continuation::Complete,
    }
}

/// First step of a case's path; an empty path goes straight to its end
fn case_entry(branch: &BranchModel, case: &BranchCaseModel) -> Continuation {
    match case.steps.first() {
        Some(first) => Continuation::Send(naming::start_command(&naming::branch_step_phase(
            branch.loop_prefix.as_deref(),
            &case.path_prefix,
            first.identifier(),
        ))),
        None => emit_path_end(PathEnd { branch, case }),
    }
}
