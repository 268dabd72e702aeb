//! Transition interpreter
//!
//! Executes the ops of a compiled transition against a `ProcessInstance`.
//! Each op has exactly the meaning the renderer writes out for it, so a
//! process behaves the same whether it runs here or as generated source.

use crate::contract::{
    discriminator_value, ApprovalDecision, Collaborators, FailureContext, Outbound, ProcessError,
    StepFailure,
};
use crate::error::{EngineError, EngineResult};
use crate::instance::ProcessInstance;
use crate::message::{Message, MessageBody};
use procflow_codegen::naming::{PHASE_COMPLETED, PHASE_FAILED, PHASE_VALIDATION_FAILED};
use procflow_codegen::{
    BranchRoute, CompiledProcess, Continuation, FailureRoute, LoopControl, Op, Transition,
};
use serde_json::Value;

/// Output of one transition
pub type Effects = Vec<Outbound<Message>>;

/// Run the start factory: a new instance plus its first dispatch
pub fn start(
    compiled: &CompiledProcess,
    message: &Message,
    cx: &Collaborators<'_, Value>,
) -> EngineResult<(ProcessInstance, Effects)> {
    let MessageBody::Start { state } = &message.body else {
        return Err(EngineError::UnexpectedBody {
            message: message.name.clone(),
            expected: "an initial state".into(),
        });
    };
    let mut instance = ProcessInstance::initialize(compiled, message.instance_id, state.clone());
    let effects = apply(&compiled.start, &mut instance, message, cx)?;
    Ok((instance, effects))
}

/// Execute one transition in place
///
/// On error the instance may be partially updated; callers that need
/// atomicity run the transition on a copy.
pub fn apply(
    transition: &Transition,
    instance: &mut ProcessInstance,
    message: &Message,
    cx: &Collaborators<'_, Value>,
) -> Result<Effects, ProcessError> {
    let mut run = Execution {
        instance,
        message,
        cx,
        failure: None,
        out: Vec::new(),
    };
    for op in &transition.body {
        if let Flow::Stop = run.op(op)? {
            break;
        }
    }
    Ok(run.out)
}

enum Flow {
    Next,
    Stop,
}

struct Execution<'r, 'c> {
    instance: &'r mut ProcessInstance,
    message: &'r Message,
    cx: &'r Collaborators<'c, Value>,
    /// Failure carried by the completion being applied
    failure: Option<StepFailure>,
    out: Effects,
}

impl Execution<'_, '_> {
    fn op(&mut self, op: &Op) -> Result<Flow, ProcessError> {
        let message = self.message;
        match op {
            Op::InitializeInstance => {}
            Op::SetPhase(phase) => self.instance.phase = phase.clone(),
            Op::Validate(guard) => {
                if !self.cx.conditions.evaluate(&guard.condition_id, &self.instance.state) {
                    tracing::debug!(
                        instance = %self.instance.id,
                        step = %guard.step,
                        condition = %guard.condition_id,
                        "Validation failed"
                    );
                    self.instance.phase = PHASE_VALIDATION_FAILED.to_string();
                    self.emit(
                        &guard.event,
                        MessageBody::ValidationFailed {
                            step: guard.step.clone(),
                            message: guard.message.clone(),
                        },
                    );
                    return Ok(Flow::Stop);
                }
            }
            Op::DispatchWork { step, command } => {
                let body = MessageBody::Work {
                    step: step.clone(),
                    state: self.instance.state.clone(),
                };
                self.emit(command, body);
            }
            Op::ApplyUpdate => {
                let MessageBody::Completed { update, failure } = &message.body else {
                    return Err(self.wrong_body("a step completion"));
                };
                self.instance.state = self.cx.reducer.reduce(&self.instance.state, update.clone());
                self.failure = failure.clone();
                if self.failure.is_some() {
                    self.instance.phase = PHASE_FAILED.to_string();
                }
            }
            Op::RouteFailure(route) => return self.route_failure(route),
            Op::Continue(continuation) => self.continuation(continuation),
            Op::Route(route) => return self.route(route).map(|()| Flow::Next),
            Op::Fork { commands, .. } => {
                for command in commands {
                    self.send(command);
                }
            }
            Op::JoinPath(target) => self.out.push(Outbound::Join {
                fork: target.fork.clone(),
                path: target.path,
                of: target.of,
                message: Message::command(&target.command, self.instance.id),
            }),
            Op::RecordPendingApproval => {
                let Some(correlation_id) = message.correlation_id() else {
                    return Err(self.wrong_body("a correlation id"));
                };
                self.instance.pending_approval_id = Some(correlation_id);
            }
            Op::GuardCorrelation { approval } => {
                let received = message.correlation_id();
                if received.is_none() || self.instance.pending_approval_id != received {
                    tracing::debug!(
                        instance = %self.instance.id,
                        approval = %approval,
                        message = %message.name,
                        "Ignoring stale approval signal"
                    );
                    return Ok(Flow::Stop);
                }
            }
            Op::ClearPendingApproval => self.instance.pending_approval_id = None,
            Op::RecordDecision => {
                let MessageBody::ApprovalDecided { decision, .. } = &message.body else {
                    return Err(self.wrong_body("an approval decision"));
                };
                self.instance.last_approval_decision = Some(*decision);
            }
            Op::Decide { approved, rejected } => {
                let MessageBody::ApprovalDecided { decision, .. } = &message.body else {
                    return Err(self.wrong_body("an approval decision"));
                };
                match decision {
                    ApprovalDecision::Approved => {
                        self.instance.pending_approval_id = None;
                        self.continuation(approved);
                    }
                    ApprovalDecision::Rejected => {
                        self.instance.pending_approval_id = None;
                        self.continuation(rejected);
                    }
                    ApprovalDecision::Deferred => {}
                }
            }
            Op::CaptureFailure => {
                let MessageBody::FailureTrigger { failure } = &message.body else {
                    return Err(self.wrong_body("a failure context"));
                };
                self.instance.failure_context = Some(failure.clone());
            }
            Op::ResumeFailedStep { targets } => {
                let failed_step = self
                    .instance
                    .failure_context
                    .as_ref()
                    .map(|f| f.failed_step.clone())
                    .unwrap_or_default();
                let Some(target) = targets.iter().find(|t| t.step == failed_step) else {
                    return Err(ProcessError::InvalidState(format!(
                        "no step to resume after failure of '{}'",
                        failed_step
                    )));
                };
                self.send(&target.command);
            }
        }
        Ok(Flow::Next)
    }

    fn route_failure(&mut self, route: &FailureRoute) -> Result<Flow, ProcessError> {
        if self.instance.phase != PHASE_FAILED {
            return Ok(Flow::Next);
        }
        let Some(failure) = self.failure.take() else {
            return Ok(Flow::Next);
        };

        if let Some(fork) = route.fork.as_ref().filter(|f| f.fail_fast) {
            self.out.push(Outbound::CancelFork {
                fork: fork.fork.clone(),
            });
        }
        match (&route.handler, &route.fork) {
            (Some(trigger), _) => {
                let context = FailureContext::capture(&route.step, &failure);
                self.emit(trigger, MessageBody::FailureTrigger { failure: context });
            }
            (None, Some(fork)) if fork.fail_fast => self.instance.is_finished = true,
            (None, Some(fork)) => {
                self.instance.phase = route.step.clone();
                self.out.push(Outbound::Join {
                    fork: fork.join.fork.clone(),
                    path: fork.join.path,
                    of: fork.join.of,
                    message: Message::command(&fork.join.command, self.instance.id),
                });
            }
            (None, None) => {
                return Err(ProcessError::StepFailed {
                    step: route.step.clone(),
                    failure,
                })
            }
        }
        Ok(Flow::Stop)
    }

    fn route(&mut self, route: &BranchRoute) -> Result<(), ProcessError> {
        let value = discriminator_value(&self.instance.state, &route.discriminator.field_path);
        let target = route
            .arms
            .iter()
            .find(|arm| arm.value == value)
            .map(|arm| &arm.target)
            .or(route.otherwise.as_ref());
        match target {
            Some(target) => {
                self.continuation(target);
                Ok(())
            }
            None => Err(ProcessError::UnmatchedBranch {
                branch: route.branch.clone(),
                value,
            }),
        }
    }

    fn continuation(&mut self, continuation: &Continuation) {
        match continuation {
            Continuation::Send(command) => self.send(command),
            Continuation::Complete => self.finish(PHASE_COMPLETED),
            Continuation::Fail => self.finish(PHASE_FAILED),
            Continuation::Loop(control) => self.loop_control(control),
            Continuation::RequestApproval(request) => {
                self.instance.phase = request.phase.clone();
                self.emit(
                    &request.event,
                    MessageBody::ApprovalRequested {
                        approval: request.approval.clone(),
                        approver_type: request.approver_type.clone(),
                    },
                );
            }
        }
    }

    fn loop_control(&mut self, control: &LoopControl) {
        let count = {
            let counter = self.instance.counters.entry(control.counter.clone()).or_insert(0);
            *counter += 1;
            *counter
        };
        let exit = count >= control.max_iterations
            || self.cx.conditions.evaluate(&control.condition_id, &self.instance.state);
        tracing::debug!(
            instance = %self.instance.id,
            loop_path = %control.loop_path,
            iteration = count,
            exit,
            "Loop control"
        );
        if exit {
            self.instance.counters.insert(control.counter.clone(), 0);
            self.continuation(&control.exit);
        } else {
            self.send(&control.repeat);
        }
    }

    fn finish(&mut self, phase: &str) {
        self.instance.phase = phase.to_string();
        self.instance.is_finished = true;
    }

    fn send(&mut self, command: &str) {
        self.out
            .push(Outbound::Send(Message::command(command, self.instance.id)));
    }

    fn emit(&mut self, name: &str, body: MessageBody) {
        self.out
            .push(Outbound::Send(Message::new(name, self.instance.id, body)));
    }

    fn wrong_body(&self, expected: &str) -> ProcessError {
        ProcessError::InvalidState(format!(
            "message '{}' does not carry {}",
            self.message.name, expected
        ))
    }
}
