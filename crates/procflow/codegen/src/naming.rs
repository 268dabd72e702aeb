//! Identifier & naming rules
//!
//! Pure functions deriving every generated name from the model. Downstream
//! tooling matches these names literally, so each rule lives here and
//! nowhere else. None of them depend on iteration or hashing order.

// ── Phases ───────────────────────────────────────────────────────────

/// Phase of a main-line step: enclosing loop names, outermost first, then the step
pub fn step_phase(loop_chain: &[&str], step: &str) -> String {
    let mut parts: Vec<&str> = loop_chain.to_vec();
    parts.push(step);
    parts.join("_")
}

/// Phase of a step on a branch path
pub fn branch_step_phase(loop_prefix: Option<&str>, path_prefix: &str, step: &str) -> String {
    match loop_prefix {
        Some(prefix) => format!("{}_{}_{}", prefix, path_prefix, step),
        None => format!("{}_{}", path_prefix, step),
    }
}

/// Phase of a step in an approval's escalation chain
pub fn escalation_step_phase(approval: &str, step: &str) -> String {
    format!("{}Escalation_{}", approval, step)
}

/// Phase of a step in an approval's rejection chain
pub fn rejection_step_phase(approval: &str, step: &str) -> String {
    format!("{}Rejection_{}", approval, step)
}

/// Phase of a recovery step
pub fn failure_handler_step(handler_id: &str, step: &str) -> String {
    format!("FailureHandler_{}_{}", sanitize(handler_id), step)
}

/// Phase held while an approval is outstanding
pub fn await_approval_phase(approval: &str) -> String {
    format!("AwaitApproval_{}", approval)
}

pub const PHASE_NOT_STARTED: &str = "NotStarted";
pub const PHASE_COMPLETED: &str = "Completed";
pub const PHASE_FAILED: &str = "Failed";
pub const PHASE_VALIDATION_FAILED: &str = "ValidationFailed";

// ── Messages ─────────────────────────────────────────────────────────

pub fn process_start_command(process: &str) -> String {
    format!("Start{}Command", process)
}

pub fn start_command(step: &str) -> String {
    format!("Start{}Command", step)
}

pub fn completed_event(step: &str) -> String {
    format!("{}Completed", step)
}

pub fn worker_command(step: &str) -> String {
    format!("Execute{}WorkerCommand", step)
}

pub fn validation_failed_event(step: &str) -> String {
    format!("{}ValidationFailed", step)
}

pub fn approval_requested_event(approval: &str) -> String {
    format!("{}ApprovalRequested", approval)
}

pub fn approval_pending_event(approval: &str) -> String {
    format!("{}ApprovalPending", approval)
}

pub fn approval_decided_event(approval: &str) -> String {
    format!("{}ApprovalDecided", approval)
}

pub fn approval_timed_out_event(approval: &str) -> String {
    format!("{}ApprovalTimedOut", approval)
}

pub fn failure_trigger_command(handler_id: &str) -> String {
    format!("StartFailureHandler_{}Command", sanitize(handler_id))
}

// ── Loops ────────────────────────────────────────────────────────────

/// The full nesting path of a loop, outermost first, concatenated
///
/// Using the whole chain rather than the innermost name keeps counters
/// distinct when the same inner loop name is reused under different parents.
pub fn loop_path(loop_chain: &[&str]) -> String {
    loop_chain.concat()
}

pub fn iteration_counter(loop_chain: &[&str]) -> String {
    format!("{}IterationCount", loop_path(loop_chain))
}

pub fn exit_check(loop_chain: &[&str]) -> String {
    format!("ShouldExit{}Loop", loop_path(loop_chain))
}

// ── Misc ─────────────────────────────────────────────────────────────

pub fn fork_id(previous_step: &str) -> String {
    format!("Fork_{}", previous_step)
}

pub fn phase_enum(process: &str) -> String {
    format!("{}Phase", process)
}

pub fn message_enum(process: &str) -> String {
    format!("{}Message", process)
}

pub fn process_struct(process: &str) -> String {
    format!("{}Process", process)
}

/// Name of the generated method handling a message
pub fn handler_name(message: &str) -> String {
    format!("handle_{}", snake_case(message))
}

/// Replace every character that cannot appear in an identifier with `_`
pub fn sanitize(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Convert a generated type name to snake case
///
/// Underscores already present act as word boundaries and are not doubled.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None | Some('_') => false,
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) => p.is_ascii_uppercase() && next.is_some_and(|n| n.is_ascii_lowercase()),
            };
            if boundary {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
