//! In-memory reference host
//!
//! Plays the durable message substrate for one compiled process: it
//! stores instances, delivers messages in FIFO order, executes worker
//! commands, counts fork joins and stands in for the approval service.
//! Every transition runs against a copy of its instance and is committed
//! only when it succeeds.

use crate::conditions::ConditionTable;
use crate::contract::{
    ApprovalDecision, Collaborators, ConditionRegistry, CorrelationId, InstanceId, NotFound,
    Outbound, ProcessError, StateReducer, StepExecutor,
};
use crate::error::{EngineError, EngineResult};
use crate::instance::ProcessInstance;
use crate::machine;
use crate::message::{Message, MessageBody};
use crate::reducer::FieldPolicyReducer;
use chrono::{DateTime, Utc};
use procflow_codegen::{naming, CompiledProcess, MessageKind, ProcessCompiler};
use procflow_model::ProcessModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, VecDeque};
use uuid::Uuid;

/// Messages delivered before `run` gives up
pub const DEFAULT_DELIVERY_LIMIT: usize = 100_000;

// ── Records ──────────────────────────────────────────────────────────

/// An approval request seen by the simulated approval service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub instance_id: InstanceId,
    pub approval: String,
    pub approver_type: String,
    pub correlation_id: CorrelationId,
    pub requested_at: DateTime<Utc>,
}

/// A transition that returned an error; its instance was left untouched
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub instance_id: InstanceId,
    pub message: String,
    pub error: ProcessError,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct JoinState {
    reported: BTreeSet<usize>,
    released: bool,
}

// ── Host ─────────────────────────────────────────────────────────────

/// Single-process in-memory substrate
pub struct ProcessHost {
    compiled: CompiledProcess,
    reducer: Box<dyn StateReducer<Value>>,
    conditions: Box<dyn ConditionRegistry<Value>>,
    executor: Box<dyn StepExecutor<Value>>,
    instances: HashMap<InstanceId, ProcessInstance>,
    finished: HashMap<InstanceId, ProcessInstance>,
    queue: VecDeque<Message>,
    joins: HashMap<(InstanceId, String), JoinState>,
    /// Cancelled forks and the path whose failure cancelled them
    cancelled: HashMap<(InstanceId, String), usize>,
    approvals: Vec<ApprovalRecord>,
    events: Vec<Message>,
    delivered: Vec<Message>,
    dropped: Vec<Message>,
    dead_letters: Vec<NotFound>,
    faults: Vec<Fault>,
    delivery_limit: usize,
}

impl ProcessHost {
    /// Host a compiled process with the default reducer and an empty condition table
    pub fn new(compiled: CompiledProcess, executor: impl StepExecutor<Value> + 'static) -> Self {
        Self {
            compiled,
            reducer: Box::new(FieldPolicyReducer::new()),
            conditions: Box::new(ConditionTable::new()),
            executor: Box::new(executor),
            instances: HashMap::new(),
            finished: HashMap::new(),
            queue: VecDeque::new(),
            joins: HashMap::new(),
            cancelled: HashMap::new(),
            approvals: Vec::new(),
            events: Vec::new(),
            delivered: Vec::new(),
            dropped: Vec::new(),
            dead_letters: Vec::new(),
            faults: Vec::new(),
            delivery_limit: DEFAULT_DELIVERY_LIMIT,
        }
    }

    /// Compile a model and host it
    pub fn from_model(
        model: &ProcessModel,
        executor: impl StepExecutor<Value> + 'static,
    ) -> EngineResult<Self> {
        let compiled = ProcessCompiler::new().compile(model)?;
        Ok(Self::new(compiled, executor))
    }

    pub fn with_reducer(mut self, reducer: impl StateReducer<Value> + 'static) -> Self {
        self.reducer = Box::new(reducer);
        self
    }

    pub fn with_conditions(mut self, conditions: impl ConditionRegistry<Value> + 'static) -> Self {
        self.conditions = Box::new(conditions);
        self
    }

    pub fn with_delivery_limit(mut self, limit: usize) -> Self {
        self.delivery_limit = limit;
        self
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start a new instance and queue its first step
    pub fn start(&mut self, state: Value) -> EngineResult<InstanceId> {
        let id = Uuid::new_v4();
        self.start_with_id(id, state)?;
        Ok(id)
    }

    pub fn start_with_id(&mut self, id: InstanceId, state: Value) -> EngineResult<()> {
        let message = Message::new(
            naming::process_start_command(&self.compiled.process),
            id,
            MessageBody::Start { state },
        );
        let cx = Collaborators::new(self.reducer.as_ref(), self.conditions.as_ref());
        let (instance, effects) = machine::start(&self.compiled, &message, &cx)?;
        tracing::info!(process = %self.compiled.process, instance = %id, "Started process instance");
        self.instances.insert(id, instance);
        self.delivered.push(message.clone());
        self.route_effects(&message, effects);
        Ok(())
    }

    /// Queue a message from outside the host
    pub fn send(&mut self, message: Message) {
        self.queue.push_back(message);
    }

    /// Deliver queued messages until the queue drains
    ///
    /// Returns the number of messages delivered.
    pub fn run(&mut self) -> EngineResult<usize> {
        let mut count = 0;
        while self.deliver_next() {
            count += 1;
            if count >= self.delivery_limit && !self.queue.is_empty() {
                return Err(EngineError::DeliveryLimit(self.delivery_limit));
            }
        }
        Ok(count)
    }

    /// Deliver one message; false once the queue is empty
    pub fn deliver_next(&mut self) -> bool {
        let Some(message) = self.queue.pop_front() else {
            return false;
        };
        self.deliver(message);
        true
    }

    // ── Approvals ────────────────────────────────────────────────────

    /// Decide the latest request of an approval gate
    pub fn decide(
        &mut self,
        instance_id: InstanceId,
        approval: &str,
        decision: ApprovalDecision,
    ) -> EngineResult<CorrelationId> {
        let correlation_id = self.latest_request(instance_id, approval)?;
        self.decide_with(instance_id, approval, correlation_id, decision);
        Ok(correlation_id)
    }

    /// Send a decision carrying an explicit, possibly stale, correlation id
    pub fn decide_with(
        &mut self,
        instance_id: InstanceId,
        approval: &str,
        correlation_id: CorrelationId,
        decision: ApprovalDecision,
    ) {
        self.send(Message::new(
            naming::approval_decided_event(approval),
            instance_id,
            MessageBody::ApprovalDecided {
                correlation_id,
                decision,
            },
        ));
    }

    /// Time out the latest request of an approval gate
    pub fn time_out(&mut self, instance_id: InstanceId, approval: &str) -> EngineResult<CorrelationId> {
        let correlation_id = self.latest_request(instance_id, approval)?;
        self.time_out_with(instance_id, approval, correlation_id);
        Ok(correlation_id)
    }

    pub fn time_out_with(
        &mut self,
        instance_id: InstanceId,
        approval: &str,
        correlation_id: CorrelationId,
    ) {
        self.send(Message::new(
            naming::approval_timed_out_event(approval),
            instance_id,
            MessageBody::ApprovalTimedOut { correlation_id },
        ));
    }

    fn latest_request(&self, instance_id: InstanceId, approval: &str) -> EngineResult<CorrelationId> {
        if self.instance(instance_id).is_none() {
            return Err(EngineError::UnknownInstance(instance_id));
        }
        self.approvals
            .iter()
            .rev()
            .find(|r| r.instance_id == instance_id && r.approval == approval)
            .map(|r| r.correlation_id)
            .ok_or_else(|| EngineError::NoApprovalRequest {
                instance_id,
                approval: approval.to_string(),
            })
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn compiled(&self) -> &CompiledProcess {
        &self.compiled
    }

    /// An instance, running or finished
    pub fn instance(&self, id: InstanceId) -> Option<&ProcessInstance> {
        self.instances.get(&id).or_else(|| self.finished.get(&id))
    }

    pub fn is_running(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn approval_requests(&self) -> &[ApprovalRecord] {
        &self.approvals
    }

    /// Events addressed to the outside world, e.g. validation failures
    pub fn events(&self) -> &[Message] {
        &self.events
    }

    /// Every message delivered, in order
    pub fn delivered(&self) -> &[Message] {
        &self.delivered
    }

    /// Messages discarded because their fork path was cancelled
    pub fn dropped(&self) -> &[Message] {
        &self.dropped
    }

    pub fn dead_letters(&self) -> &[NotFound] {
        &self.dead_letters
    }

    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    // ── Delivery ─────────────────────────────────────────────────────

    fn deliver(&mut self, message: Message) {
        if self.is_cancelled(&message) {
            tracing::debug!(message = %message, "Dropping message of a cancelled fork path");
            self.dropped.push(message);
            return;
        }
        let Some(kind) = self.compiled.message(&message.name).map(|m| m.kind) else {
            tracing::warn!(message = %message, "Unknown message");
            self.fault(&message, ProcessError::UnexpectedMessage(message.name.clone()));
            return;
        };
        tracing::debug!(message = %message, kind = %kind, "Delivering message");
        self.delivered.push(message.clone());

        if kind == MessageKind::ExecuteWorker {
            self.execute_worker(message);
            return;
        }

        let Some(instance) = self.instances.get(&message.instance_id) else {
            self.not_found(kind, &message);
            return;
        };
        let Some(transition) = self.compiled.transition_for(&message.name) else {
            self.fault(&message, ProcessError::UnexpectedMessage(message.name.clone()));
            return;
        };

        let mut working = instance.clone();
        let cx = Collaborators::new(self.reducer.as_ref(), self.conditions.as_ref());
        match machine::apply(transition, &mut working, &message, &cx) {
            Ok(effects) => {
                self.reset_forks_triggered_by(&message);
                let finished = working.is_finished;
                self.instances.insert(message.instance_id, working);
                self.route_effects(&message, effects);
                if finished {
                    self.retire(message.instance_id);
                }
            }
            Err(error) => self.fault(&message, error),
        }
    }

    fn execute_worker(&mut self, message: Message) {
        let MessageBody::Work { step, state } = &message.body else {
            self.fault(
                &message,
                ProcessError::InvalidState(format!("'{}' carries no work", message.name)),
            );
            return;
        };
        let Some(stem) = message
            .name
            .strip_prefix("Execute")
            .and_then(|rest| rest.strip_suffix("WorkerCommand"))
        else {
            self.fault(&message, ProcessError::UnexpectedMessage(message.name.clone()));
            return;
        };

        let body = match self.executor.execute(step, state) {
            Ok(update) => MessageBody::Completed {
                update,
                failure: None,
            },
            Err(failure) => {
                tracing::warn!(
                    instance = %message.instance_id,
                    step = %step,
                    error_type = %failure.error_type,
                    "Step execution failed"
                );
                MessageBody::Completed {
                    update: Value::Null,
                    failure: Some(failure),
                }
            }
        };
        self.queue.push_back(Message::new(
            naming::completed_event(stem),
            message.instance_id,
            body,
        ));
    }

    fn route_effects(&mut self, cause: &Message, effects: Vec<Outbound<Message>>) {
        for effect in effects {
            match effect {
                Outbound::Send(message) => self.dispatch(message),
                Outbound::Join {
                    fork,
                    path,
                    of,
                    message,
                } => self.join(fork, path, of, message),
                Outbound::CancelFork { fork } => self.cancel_fork(cause, fork),
            }
        }
    }

    fn dispatch(&mut self, message: Message) {
        match self.compiled.message(&message.name).map(|m| m.kind) {
            Some(MessageKind::ApprovalRequested) => {
                self.request_approval(&message);
                self.events.push(message);
            }
            Some(MessageKind::ValidationFailed) => {
                tracing::info!(message = %message, "Step validation failed");
                self.events.push(message);
            }
            _ => self.queue.push_back(message),
        }
    }

    /// Simulated approval service: assign a correlation id and acknowledge
    fn request_approval(&mut self, message: &Message) {
        let MessageBody::ApprovalRequested {
            approval,
            approver_type,
        } = &message.body
        else {
            return;
        };
        let record = ApprovalRecord {
            instance_id: message.instance_id,
            approval: approval.clone(),
            approver_type: approver_type.clone(),
            correlation_id: Uuid::new_v4(),
            requested_at: Utc::now(),
        };
        tracing::info!(
            instance = %record.instance_id,
            approval = %record.approval,
            correlation_id = %record.correlation_id,
            "Approval requested"
        );
        self.queue.push_back(Message::new(
            naming::approval_pending_event(approval),
            message.instance_id,
            MessageBody::ApprovalPending {
                correlation_id: record.correlation_id,
            },
        ));
        self.approvals.push(record);
    }

    fn join(&mut self, fork: String, path: usize, of: usize, message: Message) {
        let state = self
            .joins
            .entry((message.instance_id, fork.clone()))
            .or_default();
        state.reported.insert(path);
        tracing::debug!(
            instance = %message.instance_id,
            fork = %fork,
            path,
            reported = state.reported.len(),
            of,
            "Fork path reported"
        );
        if state.reported.len() >= of && !state.released {
            state.released = true;
            self.queue.push_back(message);
        }
    }

    fn cancel_fork(&mut self, cause: &Message, fork: String) {
        let Some(path) = self.fork_path_of(&cause.name).map(|(_, path)| path) else {
            return;
        };
        let id = cause.instance_id;
        tracing::info!(instance = %id, fork = %fork, failed_path = path, "Cancelling fork");
        self.cancelled.insert((id, fork), path);

        let (kept, dropped): (VecDeque<Message>, VecDeque<Message>) = std::mem::take(&mut self.queue)
            .into_iter()
            .partition(|m| !self.is_cancelled(m));
        self.queue = kept;
        self.dropped.extend(dropped);
    }

    fn is_cancelled(&self, message: &Message) -> bool {
        let Some((fork, path)) = self.fork_path_of(&message.name) else {
            return false;
        };
        self.cancelled
            .get(&(message.instance_id, fork.to_string()))
            .is_some_and(|&failed| failed != path)
    }

    /// Fork id and path index of a message driving a fork-path step
    fn fork_path_of(&self, name: &str) -> Option<(&str, usize)> {
        self.compiled.forks.iter().find_map(|fork| {
            fork.paths
                .iter()
                .position(|p| p.messages.iter().any(|m| m == name))
                .map(|path| (fork.id.as_str(), path))
        })
    }

    /// A fork starts over each time its trigger completes
    fn reset_forks_triggered_by(&mut self, message: &Message) {
        for fork in self.compiled.forks.iter().filter(|f| f.trigger == message.name) {
            let key = (message.instance_id, fork.id.clone());
            self.joins.remove(&key);
            self.cancelled.remove(&key);
        }
    }

    fn retire(&mut self, id: InstanceId) {
        if let Some(instance) = self.instances.remove(&id) {
            tracing::info!(instance = %id, phase = %instance.phase, "Process instance finished");
            self.finished.insert(id, instance);
        }
    }

    fn not_found(&mut self, kind: MessageKind, message: &Message) {
        if self.compiled.fallback_for(kind).is_none() {
            return;
        }
        tracing::warn!(message = %message, kind = %kind, "No instance for message");
        self.dead_letters
            .push(NotFound::new(kind.to_string(), &message.name, message.instance_id));
    }

    fn fault(&mut self, message: &Message, error: ProcessError) {
        tracing::warn!(message = %message, error = %error, "Transition failed");
        self.faults.push(Fault {
            instance_id: message.instance_id,
            message: message.name.clone(),
            error,
            at: Utc::now(),
        });
    }
}

impl std::fmt::Debug for ProcessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHost")
            .field("process", &self.compiled.process)
            .field("running", &self.instances.len())
            .field("finished", &self.finished.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}
