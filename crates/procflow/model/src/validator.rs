//! Validator: structural checks run before a model is frozen
//!
//! Everything the compiler relies on is checked here, at construction
//! time, so that code generation never has to second-guess the model.

use crate::{
    is_identifier, ApprovalModel, BranchModel, CaseValue, DiscriminatorKind, HandlerScope,
    LoopModel, ModelError, ModelResult, ProcessModel, StepModel,
};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Validate a process model
pub fn validate(model: &ProcessModel) -> ModelResult<()> {
    validate_has_steps(model)?;
    validate_identifier(&model.name)?;
    validate_sequence("main line", &model.steps)?;
    validate_loops(model)?;
    validate_branches(model)?;
    validate_approvals(model)?;
    validate_forks(model)?;
    validate_failure_handlers(model)?;
    validate_attachment_conflicts(model)?;
    Ok(())
}

fn validate_has_steps(model: &ProcessModel) -> ModelResult<()> {
    if model.steps.is_empty() {
        return Err(ModelError::EmptyProcess);
    }
    Ok(())
}

fn validate_identifier(name: &str) -> ModelResult<()> {
    if !is_identifier(name) {
        return Err(ModelError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

fn validate_sequence(scope: &str, steps: &[StepModel]) -> ModelResult<()> {
    let mut seen = HashSet::new();
    for step in steps {
        validate_identifier(step.identifier())?;
        if !seen.insert(step.identifier()) {
            return Err(ModelError::DuplicateStep {
                scope: scope.to_string(),
                step: step.identifier().to_string(),
            });
        }
    }
    Ok(())
}

fn require_step(model: &ProcessModel, construct: &str, step: &str) -> ModelResult<usize> {
    model.index_of(step).ok_or_else(|| ModelError::UnknownStep {
        construct: construct.to_string(),
        step: step.to_string(),
    })
}

// ── Loops ────────────────────────────────────────────────────────────

fn validate_loops(model: &ProcessModel) -> ModelResult<()> {
    for looped in &model.loops {
        validate_identifier(&looped.name)?;
        if looped.max_iterations == 0 {
            return Err(ModelError::InvalidLoopBound(looped.name.clone()));
        }
        let construct = format!("Loop '{}'", looped.name);
        let first = require_step(model, &construct, &looped.first_body_step)?;
        let last = require_step(model, &construct, &looped.last_body_step)?;
        if first > last {
            return Err(ModelError::InvertedLoopBody(looped.name.clone()));
        }
        if let Some(continuation) = &looped.continuation_step {
            require_step(model, &construct, continuation)?;
        }
        validate_parent(model, looped)?;
    }

    let mut paths = HashSet::new();
    for looped in &model.loops {
        let path: Vec<&str> = model
            .loop_chain(looped)
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        if !paths.insert(path.clone()) {
            return Err(ModelError::DuplicateLoop(path.join("/")));
        }
    }

    for (i, a) in model.loops.iter().enumerate() {
        for b in model.loops.iter().skip(i + 1) {
            validate_loop_pair(model, a, b)?;
        }
    }
    Ok(())
}

fn validate_parent(model: &ProcessModel, looped: &LoopModel) -> ModelResult<()> {
    let Some(parent_name) = &looped.parent_loop else {
        return Ok(());
    };
    let candidates = model.loops.iter().filter(|l| &l.name == parent_name).count();
    match candidates {
        0 => {
            return Err(ModelError::UnknownParentLoop {
                loop_name: looped.name.clone(),
                parent: parent_name.clone(),
            })
        }
        1 => {}
        _ => return Err(ModelError::AmbiguousParentLoop(parent_name.clone())),
    }

    // Walk up the ancestry; revisiting a loop means the nesting is cyclic.
    let mut visited = HashSet::new();
    let mut current = looped;
    while let Some(parent) = model.parent_of(current) {
        if std::ptr::eq(parent, looped) || !visited.insert(parent.name.as_str()) {
            return Err(ModelError::CyclicLoopNesting(looped.name.clone()));
        }
        current = parent;
    }

    let (Some((first, last)), Some(parent)) = (model.loop_range(looped), model.parent_of(looped))
    else {
        return Ok(());
    };
    match model.loop_range(parent) {
        Some((parent_first, parent_last)) if parent_first <= first && last <= parent_last => Ok(()),
        _ => Err(ModelError::LoopOutsideParent {
            loop_name: looped.name.clone(),
            parent: parent_name.clone(),
        }),
    }
}

fn is_ancestor(model: &ProcessModel, ancestor: &LoopModel, looped: &LoopModel) -> bool {
    let chain = model.loop_chain(looped);
    chain.len() > 1 && chain[..chain.len() - 1].iter().any(|l| std::ptr::eq(*l, ancestor))
}

fn validate_loop_pair(model: &ProcessModel, a: &LoopModel, b: &LoopModel) -> ModelResult<()> {
    let stacked = is_ancestor(model, a, b) || is_ancestor(model, b, a);
    if a.last_body_step == b.last_body_step && !stacked {
        return Err(ModelError::SharedLoopEnd {
            first: a.name.clone(),
            second: b.name.clone(),
            step: a.last_body_step.clone(),
        });
    }
    if let (Some((a_first, a_last)), Some((b_first, b_last))) =
        (model.loop_range(a), model.loop_range(b))
    {
        let overlap = a_first <= b_last && b_first <= a_last;
        if overlap && !stacked {
            return Err(ModelError::OverlappingLoops {
                first: a.name.clone(),
                second: b.name.clone(),
            });
        }
    }
    Ok(())
}

// ── Branches ─────────────────────────────────────────────────────────

fn validate_branches(model: &ProcessModel) -> ModelResult<()> {
    let mut ids = HashSet::new();
    for branch in &model.branches {
        validate_identifier(&branch.id)?;
        if !ids.insert(branch.id.as_str()) {
            return Err(ModelError::DuplicateBranch(branch.id.clone()));
        }
        let construct = format!("Branch '{}'", branch.id);
        require_step(model, &construct, &branch.previous_step)?;
        if let Some(rejoin) = &branch.rejoin_step {
            require_step(model, &construct, rejoin)?;
        }
        if let Some(prefix) = &branch.loop_prefix {
            validate_identifier(prefix)?;
            validate_loop_prefix(model, branch, prefix)?;
        }
        validate_cases(branch)?;
        validate_domain(branch)?;
    }
    Ok(())
}

/// Path phases must compose the same way main-line phases do.
fn validate_loop_prefix(
    model: &ProcessModel,
    branch: &BranchModel,
    prefix: &str,
) -> ModelResult<()> {
    let expected = model
        .enclosing_loops(&branch.previous_step)
        .iter()
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join("_");
    if prefix != expected {
        return Err(ModelError::LoopPrefixMismatch {
            branch: branch.id.clone(),
            prefix: prefix.to_string(),
            expected,
        });
    }
    Ok(())
}

fn validate_cases(branch: &BranchModel) -> ModelResult<()> {
    if branch.cases.is_empty() {
        return Err(ModelError::EmptyBranch(branch.id.clone()));
    }
    let otherwise = branch.cases.iter().filter(|c| c.value.is_otherwise()).count();
    if otherwise > 1 {
        return Err(ModelError::MultipleOtherwise(branch.id.clone()));
    }

    let mut values = HashSet::new();
    let mut prefixes = HashSet::new();
    for case in &branch.cases {
        if let CaseValue::Literal(value) = &case.value {
            if !values.insert(value.as_str()) {
                return Err(ModelError::DuplicateCaseValue {
                    branch: branch.id.clone(),
                    value: value.clone(),
                });
            }
        }
        validate_identifier(&case.path_prefix)?;
        if !prefixes.insert(case.path_prefix.as_str()) {
            return Err(ModelError::DuplicateStep {
                scope: format!("branch '{}'", branch.id),
                step: case.path_prefix.clone(),
            });
        }
        validate_sequence(
            &format!("branch '{}' case '{}'", branch.id, case.value),
            &case.steps,
        )?;
    }
    Ok(())
}

/// Closed enumerated domains are checked for exhaustiveness here rather
/// than left to the run-time fallback.
fn validate_domain(branch: &BranchModel) -> ModelResult<()> {
    let discriminator = &branch.discriminator;
    if discriminator.kind != DiscriminatorKind::Enumerated || discriminator.domain.is_empty() {
        return Ok(());
    }
    let domain: BTreeSet<&str> = discriminator.domain.iter().map(String::as_str).collect();
    for (value, _) in branch.literal_cases() {
        if !domain.contains(value) {
            return Err(ModelError::UnknownCaseValue {
                branch: branch.id.clone(),
                value: value.to_string(),
            });
        }
    }
    if branch.otherwise().is_some() {
        return Ok(());
    }
    let covered: HashSet<&str> = branch.literal_cases().map(|(v, _)| v).collect();
    let missing: Vec<String> = discriminator
        .domain
        .iter()
        .filter(|v| !covered.contains(v.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ModelError::NonExhaustiveBranch {
            branch: branch.id.clone(),
            missing,
        });
    }
    Ok(())
}

// ── Approvals ────────────────────────────────────────────────────────

fn validate_approvals(model: &ProcessModel) -> ModelResult<()> {
    let mut names = HashSet::new();
    for approval in &model.approvals {
        require_step(
            model,
            &format!("Approval '{}'", approval.name),
            &approval.preceding_step,
        )?;
        for link in approval.chain() {
            validate_approval_link(link)?;
            if !names.insert(link.name.as_str()) {
                return Err(ModelError::DuplicateApproval(link.name.clone()));
            }
        }
    }
    Ok(())
}

fn validate_approval_link(approval: &ApprovalModel) -> ModelResult<()> {
    validate_identifier(&approval.name)?;
    validate_sequence(
        &format!("approval '{}' escalation", approval.name),
        approval.escalation_steps(),
    )?;
    validate_sequence(
        &format!("approval '{}' rejection", approval.name),
        &approval.rejection_steps,
    )
}

// ── Forks ────────────────────────────────────────────────────────────

fn validate_forks(model: &ProcessModel) -> ModelResult<()> {
    for fork in &model.forks {
        let construct = format!("Fork after '{}'", fork.previous_step);
        require_step(model, &construct, &fork.previous_step)?;
        require_step(model, &construct, &fork.join_step)?;
        if fork.paths.len() < 2 {
            return Err(ModelError::TooFewForkPaths(fork.previous_step.clone()));
        }
        let mut all_steps = Vec::new();
        for (index, path) in fork.paths.iter().enumerate() {
            if path.steps.is_empty() {
                return Err(ModelError::EmptyForkPath {
                    step: fork.previous_step.clone(),
                    path: index,
                });
            }
            all_steps.extend(path.steps.iter().cloned());
        }
        // Paths share one namespace, so reused step types need instance names.
        validate_sequence(&format!("fork after '{}'", fork.previous_step), &all_steps)?;
    }
    Ok(())
}

// ── Failure Handlers ─────────────────────────────────────────────────

fn validate_failure_handlers(model: &ProcessModel) -> ModelResult<()> {
    let mut workflow_scoped = false;
    let mut triggers = HashSet::new();
    for handler in &model.failure_handlers {
        if handler.id.trim().is_empty() {
            return Err(ModelError::EmptyHandlerId);
        }
        if handler.steps.is_empty() {
            return Err(ModelError::EmptyRecoveryChain(handler.id.clone()));
        }
        validate_sequence(&format!("failure handler '{}'", handler.id), &handler.steps)?;
        match &handler.scope {
            HandlerScope::Workflow => {
                if workflow_scoped {
                    return Err(ModelError::DuplicateHandler("the workflow scope".into()));
                }
                workflow_scoped = true;
            }
            HandlerScope::Step(trigger) => {
                require_step(model, &format!("Failure handler '{}'", handler.id), trigger)?;
                if !triggers.insert(trigger.as_str()) {
                    return Err(ModelError::DuplicateHandler(format!("step '{}'", trigger)));
                }
            }
        }
    }
    validate_fail_fast_recovery(model)
}

/// Fork path steps fall back to the workflow handler. Once a fail-fast fork
/// has cancelled its siblings, re-running only the failed step can never
/// complete the join, so that handler must end the process instead.
fn validate_fail_fast_recovery(model: &ProcessModel) -> ModelResult<()> {
    let Some(handler) = model
        .failure_handlers
        .iter()
        .find(|h| h.scope == HandlerScope::Workflow && !h.is_terminal)
    else {
        return Ok(());
    };
    match model.forks.iter().find(|f| f.fail_fast) {
        Some(fork) => Err(ModelError::ResumeInFailFastFork {
            fork: fork.previous_step.clone(),
            handler: handler.id.clone(),
        }),
        None => Ok(()),
    }
}

// ── Attachment Conflicts ─────────────────────────────────────────────

fn validate_attachment_conflicts(model: &ProcessModel) -> ModelResult<()> {
    let mut attached: HashMap<&str, &'static str> = HashMap::new();

    // Stacked loops share their last body step; count each step once.
    let loop_ends: BTreeSet<&str> = model
        .loops
        .iter()
        .map(|l| l.last_body_step.as_str())
        .collect();
    let claims = loop_ends
        .into_iter()
        .map(|step| (step, "loop end"))
        .chain(model.branches.iter().map(|b| (b.previous_step.as_str(), "branch")))
        .chain(model.approvals.iter().map(|a| (a.preceding_step.as_str(), "approval")))
        .chain(model.forks.iter().map(|f| (f.previous_step.as_str(), "fork")));

    for (step, kind) in claims {
        if let Some(existing) = attached.insert(step, kind) {
            return Err(ModelError::ConflictingAttachments {
                step: step.to_string(),
                first: existing.to_string(),
                second: kind.to_string(),
            });
        }
    }
    Ok(())
}
