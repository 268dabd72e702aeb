//! Emission context: lookup indices built once per compilation
//!
//! Every emitter asks the context what is attached to a step instead of
//! walking the model again. The context also lays out the emission plan,
//! claims every generated phase and message name, and rejects a model
//! whose constructs would generate the same identifier twice.

use crate::error::{CodegenError, CodegenResult};
use crate::ir::{Continuation, ForkFailure, JoinTarget, MessageDef, MessageKind};
use crate::{naming, CompilerConfig};
use procflow_model::{
    ApprovalModel, BranchCaseModel, BranchModel, FailureHandlerModel, ForkModel, HandlerScope,
    LoopModel, ProcessModel, StepModel,
};
use std::collections::HashMap;

// ── Handler Context ──────────────────────────────────────────────────

/// Where a step occurrence lives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteOrigin {
    MainLine,
    BranchPath,
    ForkPath,
    Escalation,
    Rejection,
    Recovery,
}

impl std::fmt::Display for SiteOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SiteOrigin::MainLine => "main line",
            SiteOrigin::BranchPath => "branch path",
            SiteOrigin::ForkPath => "fork path",
            SiteOrigin::Escalation => "escalation chain",
            SiteOrigin::Rejection => "rejection chain",
            SiteOrigin::Recovery => "recovery chain",
        };
        write!(f, "{}", label)
    }
}

/// The last step of a branch path
#[derive(Clone, Copy, Debug)]
pub struct PathEnd<'m> {
    pub branch: &'m BranchModel,
    pub case: &'m BranchCaseModel,
}

/// What follows the last step of a sequence
#[derive(Clone, Debug)]
pub enum SequenceEnd<'m> {
    /// End of the main line or of a rejection chain
    Complete,
    /// End of a branch path
    PathEnd(PathEnd<'m>),
    /// End of a fork path
    Join(JoinTarget),
    /// End of an escalation chain: resume where the approval would have
    Continue(Continuation),
    /// End of a recovery chain
    Recovery(&'m FailureHandlerModel),
}

/// Per-step view of everything that shapes its transitions
#[derive(Clone, Debug)]
pub struct HandlerContext<'m> {
    pub step: &'m StepModel,
    pub origin: SiteOrigin,
    /// Phase assigned when the step starts
    pub phase: String,
    /// Stem of the step's message names
    pub stem: String,
    /// Position within its sequence
    pub index: usize,
    /// Message stem of the following step in the same sequence
    pub next: Option<String>,
    pub end: SequenceEnd<'m>,
    /// Loops whose last body step this is, innermost first
    pub loops: Vec<&'m LoopModel>,
    pub branch: Option<&'m BranchModel>,
    pub path_end: Option<PathEnd<'m>>,
    pub approval: Option<&'m ApprovalModel>,
    pub fork: Option<&'m ForkModel>,
    pub fork_path: Option<ForkFailure>,
    pub failure_handler: Option<&'m FailureHandlerModel>,
}

impl<'m> HandlerContext<'m> {
    fn new(
        step: &'m StepModel,
        origin: SiteOrigin,
        phase: String,
        stem: String,
        end: SequenceEnd<'m>,
    ) -> Self {
        Self {
            step,
            origin,
            phase,
            stem,
            index: 0,
            next: None,
            end,
            loops: Vec::new(),
            branch: None,
            path_end: None,
            approval: None,
            fork: None,
            fork_path: None,
            failure_handler: None,
        }
    }

    /// Last step of its sequence
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }

    pub fn start_command(&self) -> String {
        naming::start_command(&self.stem)
    }

    pub fn completed_event(&self) -> String {
        naming::completed_event(&self.stem)
    }

    pub fn worker_command(&self) -> String {
        naming::worker_command(&self.stem)
    }

    pub fn validation_failed_event(&self) -> String {
        naming::validation_failed_event(&self.stem)
    }
}

/// One entry of the emission plan
#[derive(Clone, Debug)]
pub enum Emission<'m> {
    Step(HandlerContext<'m>),
    /// An approval gate and the continuation taken once it is approved
    Approval(&'m ApprovalModel, Continuation),
    FailureHandler(&'m FailureHandlerModel),
}

// ── Emission Context ─────────────────────────────────────────────────

/// Read-only indices over one process model
pub struct EmissionContext<'m> {
    model: &'m ProcessModel,
    config: &'m CompilerConfig,
    steps_by_name: HashMap<&'m str, &'m StepModel>,
    loops_by_last_step: HashMap<&'m str, Vec<&'m LoopModel>>,
    branches_by_previous: HashMap<&'m str, &'m BranchModel>,
    path_ends: HashMap<String, PathEnd<'m>>,
    approvals_by_step: HashMap<&'m str, &'m ApprovalModel>,
    forks_by_previous: HashMap<&'m str, &'m ForkModel>,
    plan: Vec<Emission<'m>>,
    phases: Vec<String>,
    messages: Vec<MessageDef>,
}

impl<'m> EmissionContext<'m> {
    /// Build every index, lay out the plan and claim generated names
    pub fn new(model: &'m ProcessModel, config: &'m CompilerConfig) -> CodegenResult<Self> {
        let mut ctx = Self {
            model,
            config,
            steps_by_name: model.steps.iter().map(|s| (s.identifier(), s)).collect(),
            loops_by_last_step: HashMap::new(),
            branches_by_previous: model
                .branches
                .iter()
                .map(|b| (b.previous_step.as_str(), b))
                .collect(),
            path_ends: HashMap::new(),
            approvals_by_step: model
                .approvals
                .iter()
                .map(|a| (a.preceding_step.as_str(), a))
                .collect(),
            forks_by_previous: model
                .forks
                .iter()
                .map(|f| (f.previous_step.as_str(), f))
                .collect(),
            plan: Vec::new(),
            phases: Vec::new(),
            messages: Vec::new(),
        };

        for looped in &model.loops {
            ctx.loops_by_last_step
                .entry(looped.last_body_step.as_str())
                .or_default()
                .push(looped);
        }
        for stacked in ctx.loops_by_last_step.values_mut() {
            stacked.sort_by_key(|l| std::cmp::Reverse(model.loop_chain(l).len()));
        }

        for branch in &model.branches {
            for case in &branch.cases {
                if let Some(last) = case.last_step() {
                    let phase = naming::branch_step_phase(
                        branch.loop_prefix.as_deref(),
                        &case.path_prefix,
                        last.identifier(),
                    );
                    ctx.path_ends.insert(phase, PathEnd { branch, case });
                }
            }
        }

        ctx.plan = ctx.build_plan();
        ctx.claim_names()?;
        Ok(ctx)
    }

    pub fn model(&self) -> &'m ProcessModel {
        self.model
    }

    pub fn config(&self) -> &CompilerConfig {
        self.config
    }

    pub fn process_name(&self) -> &'m str {
        &self.model.name
    }

    pub fn state_type(&self) -> String {
        self.model
            .state_type
            .clone()
            .unwrap_or_else(|| self.config.default_state_type.clone())
    }

    pub fn plan(&self) -> &[Emission<'m>] {
        &self.plan
    }

    /// Every phase, reserved phases included, in declaration order
    pub fn phases(&self) -> &[String] {
        &self.phases
    }

    /// Every message, each listed once, in declaration order
    pub fn messages(&self) -> &[MessageDef] {
        &self.messages
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn step(&self, name: &str) -> Option<&'m StepModel> {
        self.steps_by_name.get(name).copied()
    }

    /// Loops ending at a main-line step, innermost first
    pub fn loops_ending_at(&self, step: &str) -> &[&'m LoopModel] {
        self.loops_by_last_step
            .get(step)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn branch_after(&self, step: &str) -> Option<&'m BranchModel> {
        self.branches_by_previous.get(step).copied()
    }

    /// The branch path ending at a phase
    pub fn path_end(&self, phase: &str) -> Option<PathEnd<'m>> {
        self.path_ends.get(phase).copied()
    }

    pub fn approval_after(&self, step: &str) -> Option<&'m ApprovalModel> {
        self.approvals_by_step.get(step).copied()
    }

    pub fn fork_after(&self, step: &str) -> Option<&'m ForkModel> {
        self.forks_by_previous.get(step).copied()
    }

    /// Loop nesting chain as names, outermost first
    pub fn loop_chain_names<'a>(&'a self, looped: &'a LoopModel) -> Vec<&'a str> {
        self.model
            .loop_chain(looped)
            .iter()
            .map(|l| l.name.as_str())
            .collect()
    }

    /// Phase of a main-line step
    pub fn main_phase(&self, step: &str) -> String {
        let chain: Vec<&str> = self
            .model
            .enclosing_loops(step)
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        naming::step_phase(&chain, step)
    }

    /// Start command of a main-line step
    pub fn main_start_command(&self, step: &str) -> String {
        naming::start_command(step)
    }

    /// Where an approval hands control once approved
    pub fn approval_continuation(&self, approval: &ApprovalModel) -> Continuation {
        match self.model.successor(&approval.preceding_step) {
            Some(next) => Continuation::Send(naming::start_command(next.identifier())),
            None => Continuation::Complete,
        }
    }

    fn workflow_handler(&self) -> Option<&'m FailureHandlerModel> {
        self.model
            .failure_handlers
            .iter()
            .find(|h| h.scope == HandlerScope::Workflow)
    }

    // ── Sites ────────────────────────────────────────────────────────

    /// Main-line steps with their attachments resolved
    pub fn main_line(&self) -> Vec<HandlerContext<'m>> {
        let sites = self
            .model
            .steps
            .iter()
            .map(|step| {
                let id = step.identifier();
                let mut hc = HandlerContext::new(
                    step,
                    SiteOrigin::MainLine,
                    self.main_phase(id),
                    id.to_string(),
                    SequenceEnd::Complete,
                );
                hc.loops = self.loops_ending_at(id).to_vec();
                hc.branch = self.branch_after(id);
                hc.approval = self.approval_after(id);
                hc.fork = self.fork_after(id);
                hc.failure_handler = self.model.failure_handler_for(id);
                hc
            })
            .collect();
        link(sites)
    }

    /// Steps of every path of a branch, case by case
    pub fn branch_paths(&self, branch: &'m BranchModel) -> Vec<HandlerContext<'m>> {
        let mut out = Vec::new();
        for case in &branch.cases {
            let sites = case
                .steps
                .iter()
                .map(|step| {
                    let phase = naming::branch_step_phase(
                        branch.loop_prefix.as_deref(),
                        &case.path_prefix,
                        step.identifier(),
                    );
                    let mut hc = HandlerContext::new(
                        step,
                        SiteOrigin::BranchPath,
                        phase.clone(),
                        phase,
                        SequenceEnd::PathEnd(PathEnd { branch, case }),
                    );
                    hc.failure_handler = self.workflow_handler();
                    hc
                })
                .collect();
            let mut sites = link(sites);
            if let Some(last) = sites.last_mut() {
                last.path_end = self.path_end(&last.phase);
            }
            out.extend(sites);
        }
        out
    }

    /// Steps of every path of a fork, path by path
    pub fn fork_paths(&self, fork: &'m ForkModel) -> Vec<HandlerContext<'m>> {
        let fork_id = naming::fork_id(&fork.previous_step);
        let of = fork.paths.len();
        let mut out = Vec::new();
        for (path, model_path) in fork.paths.iter().enumerate() {
            let join = JoinTarget {
                fork: fork_id.clone(),
                path,
                of,
                command: naming::start_command(&fork.join_step),
            };
            let sites = model_path
                .steps
                .iter()
                .map(|step| {
                    let id = step.identifier().to_string();
                    let mut hc = HandlerContext::new(
                        step,
                        SiteOrigin::ForkPath,
                        id.clone(),
                        id,
                        SequenceEnd::Join(join.clone()),
                    );
                    hc.fork_path = Some(ForkFailure {
                        fork: fork_id.clone(),
                        fail_fast: fork.fail_fast,
                        join: join.clone(),
                    });
                    hc.failure_handler = self.workflow_handler();
                    hc
                })
                .collect();
            out.extend(link(sites));
        }
        out
    }

    /// Escalation steps of one approval
    pub fn escalation_chain(
        &self,
        approval: &'m ApprovalModel,
        continuation: &Continuation,
    ) -> Vec<HandlerContext<'m>> {
        let sites = approval
            .escalation_steps()
            .iter()
            .map(|step| {
                let phase = naming::escalation_step_phase(&approval.name, step.identifier());
                let mut hc = HandlerContext::new(
                    step,
                    SiteOrigin::Escalation,
                    phase.clone(),
                    phase,
                    SequenceEnd::Continue(continuation.clone()),
                );
                hc.failure_handler = self.workflow_handler();
                hc
            })
            .collect();
        link(sites)
    }

    /// Rejection steps of one approval
    pub fn rejection_chain(&self, approval: &'m ApprovalModel) -> Vec<HandlerContext<'m>> {
        let sites = approval
            .rejection_steps
            .iter()
            .map(|step| {
                let phase = naming::rejection_step_phase(&approval.name, step.identifier());
                let mut hc = HandlerContext::new(
                    step,
                    SiteOrigin::Rejection,
                    phase.clone(),
                    phase,
                    SequenceEnd::Complete,
                );
                hc.failure_handler = self.workflow_handler();
                hc
            })
            .collect();
        link(sites)
    }

    /// Recovery steps of one failure handler
    pub fn recovery_chain(&self, handler: &'m FailureHandlerModel) -> Vec<HandlerContext<'m>> {
        let sites = handler
            .steps
            .iter()
            .map(|step| {
                let phase = naming::failure_handler_step(&handler.id, step.identifier());
                HandlerContext::new(
                    step,
                    SiteOrigin::Recovery,
                    phase.clone(),
                    phase,
                    SequenceEnd::Recovery(handler),
                )
            })
            .collect();
        link(sites)
    }

    // ── Plan ─────────────────────────────────────────────────────────

    /// Step-by-step emission order: each main-line step followed by the
    /// chains its attachments introduce, then the failure handlers.
    fn build_plan(&self) -> Vec<Emission<'m>> {
        let mut plan = Vec::new();
        for hc in self.main_line() {
            let branch = hc.branch;
            let fork = hc.fork;
            let approval = hc.approval;
            plan.push(Emission::Step(hc));

            if let Some(branch) = branch {
                plan.extend(self.branch_paths(branch).into_iter().map(Emission::Step));
            }
            if let Some(fork) = fork {
                plan.extend(self.fork_paths(fork).into_iter().map(Emission::Step));
            }
            if let Some(approval) = approval {
                let continuation = self.approval_continuation(approval);
                for gate in approval.chain() {
                    plan.push(Emission::Approval(gate, continuation.clone()));
                    plan.extend(
                        self.escalation_chain(gate, &continuation)
                            .into_iter()
                            .map(Emission::Step),
                    );
                    plan.extend(self.rejection_chain(gate).into_iter().map(Emission::Step));
                }
            }
        }
        for handler in &self.model.failure_handlers {
            plan.push(Emission::FailureHandler(handler));
            plan.extend(self.recovery_chain(handler).into_iter().map(Emission::Step));
        }
        plan
    }

    /// Record every phase and message name, rejecting collisions
    fn claim_names(&mut self) -> CodegenResult<()> {
        let mut phases = NameRegistry::default();
        let mut messages = NameRegistry::default();

        phases.claim(naming::PHASE_NOT_STARTED, "reserved phase")?;
        for reserved in [
            naming::PHASE_COMPLETED,
            naming::PHASE_FAILED,
            naming::PHASE_VALIDATION_FAILED,
        ] {
            phases.reserve(reserved, "reserved phase")?;
        }

        let process = &self.model.name;
        messages.claim(&naming::process_start_command(process), "process start")?;
        self.messages.push(MessageDef {
            name: naming::process_start_command(process),
            kind: MessageKind::StartProcess,
            subject: process.clone(),
        });

        for emission in &self.plan {
            match emission {
                Emission::Step(hc) => {
                    let owner = format!("{} step '{}'", hc.origin, hc.step.identifier());
                    phases.claim(&hc.phase, &owner)?;
                    let mut names = vec![
                        (hc.start_command(), MessageKind::StartStep),
                        (hc.worker_command(), MessageKind::ExecuteWorker),
                        (hc.completed_event(), MessageKind::StepCompleted),
                    ];
                    if hc.step.is_validated() {
                        names.push((hc.validation_failed_event(), MessageKind::ValidationFailed));
                    }
                    for (name, kind) in names {
                        messages.claim(&name, &owner)?;
                        self.messages.push(MessageDef {
                            name,
                            kind,
                            subject: hc.phase.clone(),
                        });
                    }
                }
                Emission::Approval(approval, _) => {
                    let owner = format!("approval '{}'", approval.name);
                    phases.claim(&naming::await_approval_phase(&approval.name), &owner)?;
                    for (name, kind) in [
                        (
                            naming::approval_requested_event(&approval.name),
                            MessageKind::ApprovalRequested,
                        ),
                        (
                            naming::approval_pending_event(&approval.name),
                            MessageKind::ApprovalPending,
                        ),
                        (
                            naming::approval_decided_event(&approval.name),
                            MessageKind::ApprovalDecided,
                        ),
                        (
                            naming::approval_timed_out_event(&approval.name),
                            MessageKind::ApprovalTimedOut,
                        ),
                    ] {
                        messages.claim(&name, &owner)?;
                        self.messages.push(MessageDef {
                            name,
                            kind,
                            subject: approval.name.clone(),
                        });
                    }
                }
                Emission::FailureHandler(handler) => {
                    let name = naming::failure_trigger_command(&handler.id);
                    messages.claim(&name, &format!("failure handler '{}'", handler.id))?;
                    self.messages.push(MessageDef {
                        name,
                        kind: MessageKind::FailureTrigger,
                        subject: naming::sanitize(&handler.id),
                    });
                }
            }
        }

        self.phases = phases.into_names();
        Ok(())
    }
}

/// Fill in positions and successors along one sequence
fn link(mut sites: Vec<HandlerContext<'_>>) -> Vec<HandlerContext<'_>> {
    let stems: Vec<String> = sites.iter().map(|s| s.stem.clone()).collect();
    for (index, site) in sites.iter_mut().enumerate() {
        site.index = index;
        site.next = stems.get(index + 1).cloned();
    }
    sites
}

/// Ordered set of generated names with their owners
#[derive(Default)]
struct NameRegistry {
    owners: HashMap<String, String>,
    order: Vec<String>,
    trailing: Vec<String>,
}

impl NameRegistry {
    fn claim(&mut self, name: &str, owner: &str) -> CodegenResult<()> {
        self.insert(name, owner)?;
        self.order.push(name.to_string());
        Ok(())
    }

    /// Claim a name that is listed after every ordinary claim
    fn reserve(&mut self, name: &str, owner: &str) -> CodegenResult<()> {
        self.insert(name, owner)?;
        self.trailing.push(name.to_string());
        Ok(())
    }

    fn insert(&mut self, name: &str, owner: &str) -> CodegenResult<()> {
        if let Some(first) = self.owners.get(name) {
            return Err(CodegenError::DuplicateIdentifier {
                name: name.to_string(),
                first: first.clone(),
                second: owner.to_string(),
            });
        }
        self.owners.insert(name.to_string(), owner.to_string());
        Ok(())
    }

    fn into_names(mut self) -> Vec<String> {
        self.order.append(&mut self.trailing);
        self.order
    }
}
