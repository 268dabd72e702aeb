//! Rust source renderer
//!
//! Writes a `CompiledProcess` out as one self-contained Rust module that
//! links against the run-time contract. Output depends only on the
//! compiled process and the configuration, so rendering the same input
//! twice yields byte-identical text.

use crate::ir::{
    BranchRoute, CompiledProcess, Continuation, FailureRoute, FieldKind, JoinTarget, LoopControl,
    MessageDef, MessageKind, Op, Transition, TransitionKind,
};
use crate::{naming, CompilerConfig};

// ── Code Writer ──────────────────────────────────────────────────────

/// Line-oriented writer tracking indentation
pub struct CodeWriter {
    out: String,
    depth: usize,
    width: usize,
}

impl CodeWriter {
    pub fn new(width: usize) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            width,
        }
    }

    /// Write one line at the current indentation
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.out.push_str(&" ".repeat(self.depth * self.width));
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write `text {` and indent
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(format!("{} {{", text.as_ref()));
        self.depth += 1;
    }

    /// Dedent and write `}` followed by `suffix`
    pub fn close(&mut self, suffix: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(format!("}}{}", suffix));
    }

    pub fn finish(self) -> String {
        self.out
    }
}

// ── Renderer ─────────────────────────────────────────────────────────

/// Render a compiled process as Rust source
pub fn render(process: &CompiledProcess, config: &CompilerConfig) -> String {
    let mut renderer = Renderer {
        process,
        config,
        w: CodeWriter::new(config.indent_width),
        phase_enum: naming::phase_enum(&process.process),
        message_enum: naming::message_enum(&process.process),
    };
    renderer.header();
    renderer.phases();
    renderer.messages();
    renderer.process_struct();
    renderer.process_impl();
    renderer.w.finish()
}

struct Renderer<'a> {
    process: &'a CompiledProcess,
    config: &'a CompilerConfig,
    w: CodeWriter,
    phase_enum: String,
    message_enum: String,
}

impl Renderer<'_> {
    fn doc(&mut self, text: &str) {
        if self.config.doc_comments {
            self.w.line(format!("/// {}", text));
        }
    }

    fn derives(&mut self, base: &str) {
        if self.config.serde_derives {
            self.w
                .line(format!("#[derive({}, serde::Serialize, serde::Deserialize)]", base));
        } else {
            self.w.line(format!("#[derive({})]", base));
        }
    }

    fn section(&mut self, title: &str) {
        let rule = "─".repeat(60usize.saturating_sub(title.chars().count()));
        self.w.line(format!("// ── {} {}", title, rule));
        self.w.blank();
    }

    fn header(&mut self) {
        let name = &self.process.process;
        self.w
            .line(format!("//! State machine for the `{}` process.", name));
        self.w.line("//!");
        self.w
            .line("//! @generated by procflow-codegen. Do not edit by hand.");
        self.w.blank();
        self.w.line(
            "#![allow(non_snake_case, non_camel_case_types, unused_imports, unused_mut, unused_variables, unreachable_patterns)]",
        );
        self.w.blank();
        self.w.line(format!(
            "use {}::{{",
            self.config.runtime_path
        ));
        self.w.depth += 1;
        self.w.line("discriminator_value, ApprovalDecision, Collaborators, CorrelationId, FailureContext,");
        self.w.line("InstanceId, NotFound, Outbound, ProcessError, StepFailure,");
        self.w.close(";");
        self.w.blank();
        self.doc("State carried by every instance");
        self.w
            .line(format!("pub type State = {};", self.process.state_type));
        self.w.blank();
    }

    fn phases(&mut self) {
        self.section("Phases");
        self.doc(&format!("Phases of the `{}` process", self.process.process));
        self.derives("Clone, Copy, Debug, PartialEq, Eq, Hash");
        self.w.open(format!("pub enum {}", self.phase_enum));
        for phase in &self.process.phases {
            self.w.line(format!("{},", phase));
        }
        self.w.close("");
        self.w.blank();
    }

    fn messages(&mut self) {
        let process = self.process;
        self.section("Messages");
        for message in &process.messages {
            self.message_struct(message);
        }

        self.doc(&format!("Every message of the `{}` process", self.process.process));
        self.derives("Clone, Debug");
        self.w.open(format!("pub enum {}", self.message_enum));
        for message in &self.process.messages {
            self.w.line(format!("{0}({0}),", message.name));
        }
        self.w.close("");
        self.w.blank();

        self.w.open(format!("impl {}", self.message_enum));
        self.w.open("pub fn name(&self) -> &'static str");
        self.w.open("match self");
        for message in &self.process.messages {
            self.w
                .line(format!("Self::{0}(_) => {0:?},", message.name));
        }
        self.w.close("");
        self.w.close("");
        self.w.blank();
        self.w.open("pub fn instance_id(&self) -> InstanceId");
        self.w.open("match self");
        for message in &self.process.messages {
            self.w
                .line(format!("Self::{}(m) => m.instance_id,", message.name));
        }
        self.w.close("");
        self.w.close("");
        self.w.close("");
        self.w.blank();
    }

    fn message_struct(&mut self, message: &MessageDef) {
        let role = if message.is_command() { "Command" } else { "Event" };
        self.doc(&format!("{} ({}) for `{}`", role, message.kind, message.subject));
        self.derives("Clone, Debug");
        self.w.open(format!("pub struct {}", message.name));
        self.w.line("pub instance_id: InstanceId,");
        let payload: &[&str] = match message.kind {
            MessageKind::StartProcess => &["pub state: State,"],
            MessageKind::StartStep => &[],
            MessageKind::ExecuteWorker => &["pub step: String,", "pub state: State,"],
            MessageKind::StepCompleted => &["pub update: State,", "pub failure: Option<StepFailure>,"],
            MessageKind::ValidationFailed => &["pub step: String,", "pub message: String,"],
            MessageKind::ApprovalRequested => &["pub approval: String,", "pub approver_type: String,"],
            MessageKind::ApprovalPending | MessageKind::ApprovalTimedOut => {
                &["pub correlation_id: CorrelationId,"]
            }
            MessageKind::ApprovalDecided => &[
                "pub correlation_id: CorrelationId,",
                "pub decision: ApprovalDecision,",
            ],
            MessageKind::FailureTrigger => &["pub failure: FailureContext,"],
        };
        for field in payload {
            self.w.line(*field);
        }
        self.w.close("");
        self.w.blank();
    }

    fn process_struct(&mut self) {
        self.section("Process");
        self.doc(&format!("One durable instance of the `{}` process", self.process.process));
        self.derives("Clone, Debug");
        self.w
            .open(format!("pub struct {}", naming::process_struct(&self.process.process)));
        for field in &self.process.fields {
            let ty = match &field.kind {
                FieldKind::InstanceId => "InstanceId".to_string(),
                FieldKind::State => "State".to_string(),
                FieldKind::Phase => self.phase_enum.clone(),
                FieldKind::Finished => "bool".to_string(),
                FieldKind::PendingApproval => "Option<CorrelationId>".to_string(),
                FieldKind::ApprovalDecision => "Option<ApprovalDecision>".to_string(),
                FieldKind::IterationCounter { .. } => "u32".to_string(),
                FieldKind::FailureContext => "Option<FailureContext>".to_string(),
            };
            self.w.line(format!("pub {}: {},", field.name, ty));
        }
        self.w.close("");
        self.w.blank();
    }

    fn process_impl(&mut self) {
        let process = self.process;
        self.w
            .open(format!("impl {}", naming::process_struct(&process.process)));

        for check in &process.conditions {
            self.doc(&format!("Exit check of the `{}` loop", check.loop_path));
            self.w.open(format!(
                "pub fn {}(&self, cx: &Collaborators<'_, State>) -> bool",
                check.name
            ));
            self.w.line(format!(
                "cx.conditions.evaluate({:?}, &self.state)",
                check.condition_id
            ));
            self.w.close("");
            self.w.blank();
        }

        self.start_factory(&process.start);
        for transition in &process.transitions {
            self.transition(transition);
        }
        self.dispatcher();
        self.not_found();

        self.w.close("");
    }

    fn start_factory(&mut self, start: &Transition) {
        let message_enum = self.message_enum.clone();
        self.doc("Create an instance and dispatch its first step");
        self.w.open(format!(
            "pub fn start(message: {}) -> (Self, Vec<Outbound<{}>>)",
            start.trigger, message_enum
        ));
        self.w.line("let mut out = Vec::new();");
        for op in &start.body {
            match op {
                Op::InitializeInstance => self.initialize(),
                Op::Continue(continuation) => self.continuation(continuation, "process"),
                _ => {}
            }
        }
        self.w.line("(process, out)");
        self.w.close("");
        self.w.blank();
    }

    fn initialize(&mut self) {
        self.w.open("let process = Self");
        for field in &self.process.fields {
            let value = match &field.kind {
                FieldKind::InstanceId => "message.instance_id".to_string(),
                FieldKind::State => "message.state".to_string(),
                FieldKind::Phase => format!("{}::{}", self.phase_enum, naming::PHASE_NOT_STARTED),
                FieldKind::Finished => "false".to_string(),
                FieldKind::IterationCounter { .. } => "0".to_string(),
                FieldKind::PendingApproval
                | FieldKind::ApprovalDecision
                | FieldKind::FailureContext => "None".to_string(),
            };
            self.w.line(format!("{}: {},", field.name, value));
        }
        self.w.close(";");
    }

    fn transition(&mut self, transition: &Transition) {
        let summary = match transition.kind {
            TransitionKind::StartFactory => "Start the process",
            TransitionKind::StepStart => "Start a step",
            TransitionKind::StepCompleted => "Merge a step's result and move on",
            TransitionKind::ApprovalSetPending => "Record the outstanding approval request",
            TransitionKind::ApprovalResume => "Act on an approval decision",
            TransitionKind::ApprovalTimeout => "Escalate an approval that timed out",
            TransitionKind::FailureTrigger => "Capture a failure and start recovery",
        };
        self.doc(&format!("{} (`{}`)", summary, transition.trigger));
        self.w.open(format!(
            "pub fn {}(&mut self, message: {}, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<{}>>, ProcessError>",
            transition.name, transition.trigger, self.message_enum
        ));
        self.w.line("let mut out = Vec::new();");
        for op in &transition.body {
            self.op(op);
        }
        self.w.line("Ok(out)");
        self.w.close("");
        self.w.blank();
    }

    fn op(&mut self, op: &Op) {
        match op {
            Op::InitializeInstance => self.initialize(),
            Op::SetPhase(phase) => self.set_phase(phase),
            Op::Validate(guard) => {
                self.w.open(format!(
                    "if !cx.conditions.evaluate({:?}, &self.state)",
                    guard.condition_id
                ));
                self.set_phase(naming::PHASE_VALIDATION_FAILED);
                self.w.line(format!(
                    "out.push(Outbound::Send({}::{1}({1} {{ instance_id: self.instance_id, step: {2:?}.to_string(), message: {3:?}.to_string() }})));",
                    self.message_enum, guard.event, guard.step, guard.message
                ));
                self.w.line("return Ok(out);");
                self.w.close("");
            }
            Op::DispatchWork { step, command } => {
                self.w.line(format!(
                    "out.push(Outbound::Send({}::{1}({1} {{ instance_id: self.instance_id, step: {2:?}.to_string(), state: self.state.clone() }})));",
                    self.message_enum, command, step
                ));
            }
            Op::ApplyUpdate => {
                self.w.line("let failure = message.failure;");
                self.w
                    .line("self.state = cx.reducer.reduce(&self.state, message.update);");
                self.w.open("if failure.is_some()");
                self.set_phase(naming::PHASE_FAILED);
                self.w.close("");
            }
            Op::RouteFailure(route) => self.route_failure(route),
            Op::Continue(continuation) => self.continuation(continuation, "self"),
            Op::Route(route) => self.route(route),
            Op::Fork { commands, .. } => {
                for command in commands {
                    self.send(command, "self");
                }
            }
            Op::JoinPath(target) => self.join(target),
            Op::RecordPendingApproval => {
                self.w
                    .line("self.pending_approval_id = Some(message.correlation_id);");
            }
            Op::GuardCorrelation { approval } => {
                self.w.line(format!(
                    "// Stale or duplicate signal for `{}`: the request it answers is gone",
                    approval
                ));
                self.w
                    .open("if self.pending_approval_id != Some(message.correlation_id)");
                self.w.line("return Ok(out);");
                self.w.close("");
            }
            Op::ClearPendingApproval => self.w.line("self.pending_approval_id = None;"),
            Op::RecordDecision => {
                self.w
                    .line("self.last_approval_decision = Some(message.decision);");
            }
            Op::Decide { approved, rejected } => {
                self.w.open("match message.decision");
                self.w.open("ApprovalDecision::Approved =>");
                self.w.line("self.pending_approval_id = None;");
                self.continuation(approved, "self");
                self.w.close("");
                self.w.open("ApprovalDecision::Rejected =>");
                self.w.line("self.pending_approval_id = None;");
                self.continuation(rejected, "self");
                self.w.close("");
                self.w.line("ApprovalDecision::Deferred => {}");
                self.w.close("");
            }
            Op::CaptureFailure => self.w.line("self.failure_context = Some(message.failure);"),
            Op::ResumeFailedStep { targets } => {
                self.w.line("let failed_step = self.failure_context.as_ref().map(|f| f.failed_step.clone()).unwrap_or_default();");
                self.w.open("match failed_step.as_str()");
                for target in targets {
                    self.w.open(format!("{:?} =>", target.step));
                    self.send(&target.command, "self");
                    self.w.close("");
                }
                self.w.line("other => return Err(ProcessError::InvalidState(format!(\"no step to resume after failure of '{}'\", other))),");
                self.w.close("");
            }
        }
    }

    fn set_phase(&mut self, phase: &str) {
        self.w
            .line(format!("self.phase = {}::{};", self.phase_enum, phase));
    }

    fn send(&mut self, command: &str, receiver: &str) {
        self.w.line(format!(
            "out.push(Outbound::Send({}::{1}({1} {{ instance_id: {2}.instance_id }})));",
            self.message_enum, command, receiver
        ));
    }

    fn join(&mut self, target: &JoinTarget) {
        self.w.line(format!(
            "out.push(Outbound::Join {{ fork: {:?}.to_string(), path: {}, of: {}, message: {}::{4}({4} {{ instance_id: self.instance_id }}) }});",
            target.fork, target.path, target.of, self.message_enum, target.command
        ));
    }

    fn continuation(&mut self, continuation: &Continuation, receiver: &str) {
        match continuation {
            Continuation::Send(command) => self.send(command, receiver),
            Continuation::Complete => {
                self.set_phase(naming::PHASE_COMPLETED);
                self.w.line("self.is_finished = true;");
            }
            Continuation::Fail => {
                self.set_phase(naming::PHASE_FAILED);
                self.w.line("self.is_finished = true;");
            }
            Continuation::Loop(control) => self.loop_control(control),
            Continuation::RequestApproval(request) => {
                self.set_phase(&request.phase);
                self.w.line(format!(
                    "out.push(Outbound::Send({}::{1}({1} {{ instance_id: self.instance_id, approval: {2:?}.to_string(), approver_type: {3:?}.to_string() }})));",
                    self.message_enum, request.event, request.approval, request.approver_type
                ));
            }
        }
    }

    fn loop_control(&mut self, control: &LoopControl) {
        self.w.line(format!("self.{} += 1;", control.counter));
        self.w.open(format!(
            "if self.{} >= {} || self.{}(cx)",
            control.counter, control.max_iterations, control.check
        ));
        self.w.line(format!("self.{} = 0;", control.counter));
        self.continuation(&control.exit, "self");
        self.w.close("");
        self.w.open("else");
        self.send(&control.repeat, "self");
        self.w.close("");
    }

    fn route(&mut self, route: &BranchRoute) {
        self.w.open(format!(
            "match discriminator_value(&self.state, {:?}).as_str()",
            route.discriminator.field_path
        ));
        for arm in &route.arms {
            self.w.open(format!("{:?} =>", arm.value));
            self.continuation(&arm.target, "self");
            self.w.close("");
        }
        match &route.otherwise {
            Some(target) => {
                self.w.open("_ =>");
                self.continuation(target, "self");
                self.w.close("");
            }
            None => {
                self.w.open("value =>");
                self.w.line(format!(
                    "return Err(ProcessError::UnmatchedBranch {{ branch: {:?}.to_string(), value: value.to_string() }});",
                    route.branch
                ));
                self.w.close("");
            }
        }
        self.w.close("");
    }

    fn route_failure(&mut self, route: &FailureRoute) {
        self.w.open(format!(
            "if self.phase == {}::{}",
            self.phase_enum,
            naming::PHASE_FAILED
        ));
        self.w.open("if let Some(failure) = failure");
        if let Some(fork) = route.fork.as_ref().filter(|f| f.fail_fast) {
            self.w.line(format!(
                "out.push(Outbound::CancelFork {{ fork: {:?}.to_string() }});",
                fork.fork
            ));
        }
        match (&route.handler, &route.fork) {
            (Some(trigger), _) => {
                self.w.line(format!(
                    "out.push(Outbound::Send({}::{1}({1} {{ instance_id: self.instance_id, failure: FailureContext::capture({2:?}, &failure) }})));",
                    self.message_enum, trigger, route.step
                ));
            }
            (None, Some(fork)) if fork.fail_fast => {
                self.w.line("self.is_finished = true;");
            }
            (None, Some(fork)) => {
                self.set_phase(&route.step);
                self.join(&fork.join);
            }
            (None, None) => {
                self.w.line(format!(
                    "return Err(ProcessError::StepFailed {{ step: {:?}.to_string(), failure }});",
                    route.step
                ));
            }
        }
        if !(route.handler.is_none() && route.fork.is_none()) {
            self.w.line("return Ok(out);");
        }
        self.w.close("");
        self.w.close("");
    }

    fn dispatcher(&mut self) {
        self.doc("Route a message to its transition");
        self.w.open(format!(
            "pub fn handle(&mut self, message: {0}, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<{0}>>, ProcessError>",
            self.message_enum
        ));
        self.w.open("match message");
        for transition in &self.process.transitions {
            self.w.line(format!(
                "{}::{}(message) => self.{}(message, cx),",
                self.message_enum, transition.trigger, transition.name
            ));
        }
        self.w.line(
            "other => Err(ProcessError::UnexpectedMessage(other.name().to_string())),",
        );
        self.w.close("");
        self.w.close("");
        self.w.blank();
    }

    fn not_found(&mut self) {
        self.doc("Record a message whose instance no longer exists");
        self.w.open(format!(
            "pub fn not_found(message: &{}) -> Option<NotFound>",
            self.message_enum
        ));
        self.w.open("let kind = match message");
        for fallback in &self.process.not_found {
            let arms: Vec<String> = fallback
                .messages
                .iter()
                .map(|m| format!("{}::{}(_)", self.message_enum, m))
                .collect();
            self.w
                .line(format!("{} => {:?},", arms.join(" | "), fallback.kind.to_string()));
        }
        self.w.line("_ => return None,");
        self.w.close(";");
        self.w
            .line("Some(NotFound::new(kind, message.name(), message.instance_id()))");
        self.w.close("");
    }
}
