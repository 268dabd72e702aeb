//! State machine for the `Editorial` process.
//!
//! @generated by procflow-codegen. Do not edit by hand.

#![allow(non_snake_case, non_camel_case_types, unused_imports, unused_mut, unused_variables, unreachable_patterns)]

use procflow_engine::contract::{
    discriminator_value, ApprovalDecision, Collaborators, CorrelationId, FailureContext,
    InstanceId, NotFound, Outbound, ProcessError, StepFailure,
};

/// State carried by every instance
pub type State = serde_json::Value;

// ── Phases ──────────────────────────────────────────────────────

/// Phases of the `Editorial` process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EditorialPhase {
    NotStarted,
    Refine_Draft,
    Review,
    AwaitApproval_Editor,
    AwaitApproval_Director,
    Classify,
    Rush_Expedite,
    Gather,
    FetchSales,
    FetchCosts,
    Merge,
    FailureHandler_alert_Notify,
    Completed,
    Failed,
    ValidationFailed,
}

// ── Messages ────────────────────────────────────────────────────

/// Command (start_process) for `Editorial`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartEditorialCommand {
    pub instance_id: InstanceId,
    pub state: State,
}

/// Command (start_step) for `Refine_Draft`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartDraftCommand {
    pub instance_id: InstanceId,
}

/// Command (execute_worker) for `Refine_Draft`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExecuteDraftWorkerCommand {
    pub instance_id: InstanceId,
    pub step: String,
    pub state: State,
}

/// Event (step_completed) for `Refine_Draft`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DraftCompleted {
    pub instance_id: InstanceId,
    pub update: State,
    pub failure: Option<StepFailure>,
}

/// Command (start_step) for `Review`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartReviewCommand {
    pub instance_id: InstanceId,
}

/// Command (execute_worker) for `Review`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExecuteReviewWorkerCommand {
    pub instance_id: InstanceId,
    pub step: String,
    pub state: State,
}

/// Event (step_completed) for `Review`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ReviewCompleted {
    pub instance_id: InstanceId,
    pub update: State,
    pub failure: Option<StepFailure>,
}

/// Event (approval_requested) for `Editor`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EditorApprovalRequested {
    pub instance_id: InstanceId,
    pub approval: String,
    pub approver_type: String,
}

/// Event (approval_pending) for `Editor`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EditorApprovalPending {
    pub instance_id: InstanceId,
    pub correlation_id: CorrelationId,
}

/// Event (approval_decided) for `Editor`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EditorApprovalDecided {
    pub instance_id: InstanceId,
    pub correlation_id: CorrelationId,
    pub decision: ApprovalDecision,
}

/// Event (approval_timed_out) for `Editor`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EditorApprovalTimedOut {
    pub instance_id: InstanceId,
    pub correlation_id: CorrelationId,
}

/// Event (approval_requested) for `Director`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DirectorApprovalRequested {
    pub instance_id: InstanceId,
    pub approval: String,
    pub approver_type: String,
}

/// Event (approval_pending) for `Director`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DirectorApprovalPending {
    pub instance_id: InstanceId,
    pub correlation_id: CorrelationId,
}

/// Event (approval_decided) for `Director`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DirectorApprovalDecided {
    pub instance_id: InstanceId,
    pub correlation_id: CorrelationId,
    pub decision: ApprovalDecision,
}

/// Event (approval_timed_out) for `Director`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DirectorApprovalTimedOut {
    pub instance_id: InstanceId,
    pub correlation_id: CorrelationId,
}

/// Command (start_step) for `Classify`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartClassifyCommand {
    pub instance_id: InstanceId,
}

/// Command (execute_worker) for `Classify`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExecuteClassifyWorkerCommand {
    pub instance_id: InstanceId,
    pub step: String,
    pub state: State,
}

/// Event (step_completed) for `Classify`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClassifyCompleted {
    pub instance_id: InstanceId,
    pub update: State,
    pub failure: Option<StepFailure>,
}

/// Command (start_step) for `Rush_Expedite`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartRush_ExpediteCommand {
    pub instance_id: InstanceId,
}

/// Command (execute_worker) for `Rush_Expedite`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExecuteRush_ExpediteWorkerCommand {
    pub instance_id: InstanceId,
    pub step: String,
    pub state: State,
}

/// Event (step_completed) for `Rush_Expedite`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Rush_ExpediteCompleted {
    pub instance_id: InstanceId,
    pub update: State,
    pub failure: Option<StepFailure>,
}

/// Command (start_step) for `Gather`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartGatherCommand {
    pub instance_id: InstanceId,
}

/// Command (execute_worker) for `Gather`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExecuteGatherWorkerCommand {
    pub instance_id: InstanceId,
    pub step: String,
    pub state: State,
}

/// Event (step_completed) for `Gather`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GatherCompleted {
    pub instance_id: InstanceId,
    pub update: State,
    pub failure: Option<StepFailure>,
}

/// Command (start_step) for `FetchSales`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartFetchSalesCommand {
    pub instance_id: InstanceId,
}

/// Command (execute_worker) for `FetchSales`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExecuteFetchSalesWorkerCommand {
    pub instance_id: InstanceId,
    pub step: String,
    pub state: State,
}

/// Event (step_completed) for `FetchSales`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FetchSalesCompleted {
    pub instance_id: InstanceId,
    pub update: State,
    pub failure: Option<StepFailure>,
}

/// Command (start_step) for `FetchCosts`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartFetchCostsCommand {
    pub instance_id: InstanceId,
}

/// Command (execute_worker) for `FetchCosts`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExecuteFetchCostsWorkerCommand {
    pub instance_id: InstanceId,
    pub step: String,
    pub state: State,
}

/// Event (step_completed) for `FetchCosts`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FetchCostsCompleted {
    pub instance_id: InstanceId,
    pub update: State,
    pub failure: Option<StepFailure>,
}

/// Command (start_step) for `Merge`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartMergeCommand {
    pub instance_id: InstanceId,
}

/// Command (execute_worker) for `Merge`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExecuteMergeWorkerCommand {
    pub instance_id: InstanceId,
    pub step: String,
    pub state: State,
}

/// Event (step_completed) for `Merge`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MergeCompleted {
    pub instance_id: InstanceId,
    pub update: State,
    pub failure: Option<StepFailure>,
}

/// Event (validation_failed) for `Merge`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MergeValidationFailed {
    pub instance_id: InstanceId,
    pub step: String,
    pub message: String,
}

/// Command (failure_trigger) for `alert`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartFailureHandler_alertCommand {
    pub instance_id: InstanceId,
    pub failure: FailureContext,
}

/// Command (start_step) for `FailureHandler_alert_Notify`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StartFailureHandler_alert_NotifyCommand {
    pub instance_id: InstanceId,
}

/// Command (execute_worker) for `FailureHandler_alert_Notify`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExecuteFailureHandler_alert_NotifyWorkerCommand {
    pub instance_id: InstanceId,
    pub step: String,
    pub state: State,
}

/// Event (step_completed) for `FailureHandler_alert_Notify`
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FailureHandler_alert_NotifyCompleted {
    pub instance_id: InstanceId,
    pub update: State,
    pub failure: Option<StepFailure>,
}

/// Every message of the `Editorial` process
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum EditorialMessage {
    StartEditorialCommand(StartEditorialCommand),
    StartDraftCommand(StartDraftCommand),
    ExecuteDraftWorkerCommand(ExecuteDraftWorkerCommand),
    DraftCompleted(DraftCompleted),
    StartReviewCommand(StartReviewCommand),
    ExecuteReviewWorkerCommand(ExecuteReviewWorkerCommand),
    ReviewCompleted(ReviewCompleted),
    EditorApprovalRequested(EditorApprovalRequested),
    EditorApprovalPending(EditorApprovalPending),
    EditorApprovalDecided(EditorApprovalDecided),
    EditorApprovalTimedOut(EditorApprovalTimedOut),
    DirectorApprovalRequested(DirectorApprovalRequested),
    DirectorApprovalPending(DirectorApprovalPending),
    DirectorApprovalDecided(DirectorApprovalDecided),
    DirectorApprovalTimedOut(DirectorApprovalTimedOut),
    StartClassifyCommand(StartClassifyCommand),
    ExecuteClassifyWorkerCommand(ExecuteClassifyWorkerCommand),
    ClassifyCompleted(ClassifyCompleted),
    StartRush_ExpediteCommand(StartRush_ExpediteCommand),
    ExecuteRush_ExpediteWorkerCommand(ExecuteRush_ExpediteWorkerCommand),
    Rush_ExpediteCompleted(Rush_ExpediteCompleted),
    StartGatherCommand(StartGatherCommand),
    ExecuteGatherWorkerCommand(ExecuteGatherWorkerCommand),
    GatherCompleted(GatherCompleted),
    StartFetchSalesCommand(StartFetchSalesCommand),
    ExecuteFetchSalesWorkerCommand(ExecuteFetchSalesWorkerCommand),
    FetchSalesCompleted(FetchSalesCompleted),
    StartFetchCostsCommand(StartFetchCostsCommand),
    ExecuteFetchCostsWorkerCommand(ExecuteFetchCostsWorkerCommand),
    FetchCostsCompleted(FetchCostsCompleted),
    StartMergeCommand(StartMergeCommand),
    ExecuteMergeWorkerCommand(ExecuteMergeWorkerCommand),
    MergeCompleted(MergeCompleted),
    MergeValidationFailed(MergeValidationFailed),
    StartFailureHandler_alertCommand(StartFailureHandler_alertCommand),
    StartFailureHandler_alert_NotifyCommand(StartFailureHandler_alert_NotifyCommand),
    ExecuteFailureHandler_alert_NotifyWorkerCommand(ExecuteFailureHandler_alert_NotifyWorkerCommand),
    FailureHandler_alert_NotifyCompleted(FailureHandler_alert_NotifyCompleted),
}

impl EditorialMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartEditorialCommand(_) => "StartEditorialCommand",
            Self::StartDraftCommand(_) => "StartDraftCommand",
            Self::ExecuteDraftWorkerCommand(_) => "ExecuteDraftWorkerCommand",
            Self::DraftCompleted(_) => "DraftCompleted",
            Self::StartReviewCommand(_) => "StartReviewCommand",
            Self::ExecuteReviewWorkerCommand(_) => "ExecuteReviewWorkerCommand",
            Self::ReviewCompleted(_) => "ReviewCompleted",
            Self::EditorApprovalRequested(_) => "EditorApprovalRequested",
            Self::EditorApprovalPending(_) => "EditorApprovalPending",
            Self::EditorApprovalDecided(_) => "EditorApprovalDecided",
            Self::EditorApprovalTimedOut(_) => "EditorApprovalTimedOut",
            Self::DirectorApprovalRequested(_) => "DirectorApprovalRequested",
            Self::DirectorApprovalPending(_) => "DirectorApprovalPending",
            Self::DirectorApprovalDecided(_) => "DirectorApprovalDecided",
            Self::DirectorApprovalTimedOut(_) => "DirectorApprovalTimedOut",
            Self::StartClassifyCommand(_) => "StartClassifyCommand",
            Self::ExecuteClassifyWorkerCommand(_) => "ExecuteClassifyWorkerCommand",
            Self::ClassifyCompleted(_) => "ClassifyCompleted",
            Self::StartRush_ExpediteCommand(_) => "StartRush_ExpediteCommand",
            Self::ExecuteRush_ExpediteWorkerCommand(_) => "ExecuteRush_ExpediteWorkerCommand",
            Self::Rush_ExpediteCompleted(_) => "Rush_ExpediteCompleted",
            Self::StartGatherCommand(_) => "StartGatherCommand",
            Self::ExecuteGatherWorkerCommand(_) => "ExecuteGatherWorkerCommand",
            Self::GatherCompleted(_) => "GatherCompleted",
            Self::StartFetchSalesCommand(_) => "StartFetchSalesCommand",
            Self::ExecuteFetchSalesWorkerCommand(_) => "ExecuteFetchSalesWorkerCommand",
            Self::FetchSalesCompleted(_) => "FetchSalesCompleted",
            Self::StartFetchCostsCommand(_) => "StartFetchCostsCommand",
            Self::ExecuteFetchCostsWorkerCommand(_) => "ExecuteFetchCostsWorkerCommand",
            Self::FetchCostsCompleted(_) => "FetchCostsCompleted",
            Self::StartMergeCommand(_) => "StartMergeCommand",
            Self::ExecuteMergeWorkerCommand(_) => "ExecuteMergeWorkerCommand",
            Self::MergeCompleted(_) => "MergeCompleted",
            Self::MergeValidationFailed(_) => "MergeValidationFailed",
            Self::StartFailureHandler_alertCommand(_) => "StartFailureHandler_alertCommand",
            Self::StartFailureHandler_alert_NotifyCommand(_) => "StartFailureHandler_alert_NotifyCommand",
            Self::ExecuteFailureHandler_alert_NotifyWorkerCommand(_) => "ExecuteFailureHandler_alert_NotifyWorkerCommand",
            Self::FailureHandler_alert_NotifyCompleted(_) => "FailureHandler_alert_NotifyCompleted",
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        match self {
            Self::StartEditorialCommand(m) => m.instance_id,
            Self::StartDraftCommand(m) => m.instance_id,
            Self::ExecuteDraftWorkerCommand(m) => m.instance_id,
            Self::DraftCompleted(m) => m.instance_id,
            Self::StartReviewCommand(m) => m.instance_id,
            Self::ExecuteReviewWorkerCommand(m) => m.instance_id,
            Self::ReviewCompleted(m) => m.instance_id,
            Self::EditorApprovalRequested(m) => m.instance_id,
            Self::EditorApprovalPending(m) => m.instance_id,
            Self::EditorApprovalDecided(m) => m.instance_id,
            Self::EditorApprovalTimedOut(m) => m.instance_id,
            Self::DirectorApprovalRequested(m) => m.instance_id,
            Self::DirectorApprovalPending(m) => m.instance_id,
            Self::DirectorApprovalDecided(m) => m.instance_id,
            Self::DirectorApprovalTimedOut(m) => m.instance_id,
            Self::StartClassifyCommand(m) => m.instance_id,
            Self::ExecuteClassifyWorkerCommand(m) => m.instance_id,
            Self::ClassifyCompleted(m) => m.instance_id,
            Self::StartRush_ExpediteCommand(m) => m.instance_id,
            Self::ExecuteRush_ExpediteWorkerCommand(m) => m.instance_id,
            Self::Rush_ExpediteCompleted(m) => m.instance_id,
            Self::StartGatherCommand(m) => m.instance_id,
            Self::ExecuteGatherWorkerCommand(m) => m.instance_id,
            Self::GatherCompleted(m) => m.instance_id,
            Self::StartFetchSalesCommand(m) => m.instance_id,
            Self::ExecuteFetchSalesWorkerCommand(m) => m.instance_id,
            Self::FetchSalesCompleted(m) => m.instance_id,
            Self::StartFetchCostsCommand(m) => m.instance_id,
            Self::ExecuteFetchCostsWorkerCommand(m) => m.instance_id,
            Self::FetchCostsCompleted(m) => m.instance_id,
            Self::StartMergeCommand(m) => m.instance_id,
            Self::ExecuteMergeWorkerCommand(m) => m.instance_id,
            Self::MergeCompleted(m) => m.instance_id,
            Self::MergeValidationFailed(m) => m.instance_id,
            Self::StartFailureHandler_alertCommand(m) => m.instance_id,
            Self::StartFailureHandler_alert_NotifyCommand(m) => m.instance_id,
            Self::ExecuteFailureHandler_alert_NotifyWorkerCommand(m) => m.instance_id,
            Self::FailureHandler_alert_NotifyCompleted(m) => m.instance_id,
        }
    }
}

// ── Process ─────────────────────────────────────────────────────

/// One durable instance of the `Editorial` process
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EditorialProcess {
    pub instance_id: InstanceId,
    pub state: State,
    pub phase: EditorialPhase,
    pub is_finished: bool,
    pub pending_approval_id: Option<CorrelationId>,
    pub last_approval_decision: Option<ApprovalDecision>,
    pub RefineIterationCount: u32,
    pub failure_context: Option<FailureContext>,
}

impl EditorialProcess {
    /// Exit check of the `Refine` loop
    pub fn ShouldExitRefineLoop(&self, cx: &Collaborators<'_, State>) -> bool {
        cx.conditions.evaluate("Polished", &self.state)
    }

    /// Create an instance and dispatch its first step
    pub fn start(message: StartEditorialCommand) -> (Self, Vec<Outbound<EditorialMessage>>) {
        let mut out = Vec::new();
        let process = Self {
            instance_id: message.instance_id,
            state: message.state,
            phase: EditorialPhase::NotStarted,
            is_finished: false,
            pending_approval_id: None,
            last_approval_decision: None,
            RefineIterationCount: 0,
            failure_context: None,
        };
        out.push(Outbound::Send(EditorialMessage::StartDraftCommand(StartDraftCommand { instance_id: process.instance_id })));
        (process, out)
    }

    /// Start a step (`StartDraftCommand`)
    pub fn handle_start_draft_command(&mut self, message: StartDraftCommand, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.phase = EditorialPhase::Refine_Draft;
        out.push(Outbound::Send(EditorialMessage::ExecuteDraftWorkerCommand(ExecuteDraftWorkerCommand { instance_id: self.instance_id, step: "Draft".to_string(), state: self.state.clone() })));
        Ok(out)
    }

    /// Merge a step's result and move on (`DraftCompleted`)
    pub fn handle_draft_completed(&mut self, message: DraftCompleted, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        let failure = message.failure;
        self.state = cx.reducer.reduce(&self.state, message.update);
        if failure.is_some() {
            self.phase = EditorialPhase::Failed;
        }
        if self.phase == EditorialPhase::Failed {
            if let Some(failure) = failure {
                out.push(Outbound::Send(EditorialMessage::StartFailureHandler_alertCommand(StartFailureHandler_alertCommand { instance_id: self.instance_id, failure: FailureContext::capture("Refine_Draft", &failure) })));
                return Ok(out);
            }
        }
        self.RefineIterationCount += 1;
        if self.RefineIterationCount >= 3 || self.ShouldExitRefineLoop(cx) {
            self.RefineIterationCount = 0;
            out.push(Outbound::Send(EditorialMessage::StartReviewCommand(StartReviewCommand { instance_id: self.instance_id })));
        }
        else {
            out.push(Outbound::Send(EditorialMessage::StartDraftCommand(StartDraftCommand { instance_id: self.instance_id })));
        }
        Ok(out)
    }

    /// Start a step (`StartReviewCommand`)
    pub fn handle_start_review_command(&mut self, message: StartReviewCommand, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.phase = EditorialPhase::Review;
        out.push(Outbound::Send(EditorialMessage::ExecuteReviewWorkerCommand(ExecuteReviewWorkerCommand { instance_id: self.instance_id, step: "Review".to_string(), state: self.state.clone() })));
        Ok(out)
    }

    /// Merge a step's result and move on (`ReviewCompleted`)
    pub fn handle_review_completed(&mut self, message: ReviewCompleted, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        let failure = message.failure;
        self.state = cx.reducer.reduce(&self.state, message.update);
        if failure.is_some() {
            self.phase = EditorialPhase::Failed;
        }
        if self.phase == EditorialPhase::Failed {
            if let Some(failure) = failure {
                out.push(Outbound::Send(EditorialMessage::StartFailureHandler_alertCommand(StartFailureHandler_alertCommand { instance_id: self.instance_id, failure: FailureContext::capture("Review", &failure) })));
                return Ok(out);
            }
        }
        self.phase = EditorialPhase::AwaitApproval_Editor;
        out.push(Outbound::Send(EditorialMessage::EditorApprovalRequested(EditorApprovalRequested { instance_id: self.instance_id, approval: "Editor".to_string(), approver_type: "editor".to_string() })));
        Ok(out)
    }

    /// Record the outstanding approval request (`EditorApprovalPending`)
    pub fn handle_editor_approval_pending(&mut self, message: EditorApprovalPending, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.pending_approval_id = Some(message.correlation_id);
        Ok(out)
    }

    /// Act on an approval decision (`EditorApprovalDecided`)
    pub fn handle_editor_approval_decided(&mut self, message: EditorApprovalDecided, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        // Stale or duplicate signal for `Editor`: the request it answers is gone
        if self.pending_approval_id != Some(message.correlation_id) {
            return Ok(out);
        }
        self.last_approval_decision = Some(message.decision);
        match message.decision {
            ApprovalDecision::Approved => {
                self.pending_approval_id = None;
                out.push(Outbound::Send(EditorialMessage::StartClassifyCommand(StartClassifyCommand { instance_id: self.instance_id })));
            }
            ApprovalDecision::Rejected => {
                self.pending_approval_id = None;
                self.phase = EditorialPhase::Failed;
                self.is_finished = true;
            }
            ApprovalDecision::Deferred => {}
        }
        Ok(out)
    }

    /// Escalate an approval that timed out (`EditorApprovalTimedOut`)
    pub fn handle_editor_approval_timed_out(&mut self, message: EditorApprovalTimedOut, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        // Stale or duplicate signal for `Editor`: the request it answers is gone
        if self.pending_approval_id != Some(message.correlation_id) {
            return Ok(out);
        }
        self.pending_approval_id = None;
        self.phase = EditorialPhase::AwaitApproval_Director;
        out.push(Outbound::Send(EditorialMessage::DirectorApprovalRequested(DirectorApprovalRequested { instance_id: self.instance_id, approval: "Director".to_string(), approver_type: "director".to_string() })));
        Ok(out)
    }

    /// Record the outstanding approval request (`DirectorApprovalPending`)
    pub fn handle_director_approval_pending(&mut self, message: DirectorApprovalPending, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.pending_approval_id = Some(message.correlation_id);
        Ok(out)
    }

    /// Act on an approval decision (`DirectorApprovalDecided`)
    pub fn handle_director_approval_decided(&mut self, message: DirectorApprovalDecided, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        // Stale or duplicate signal for `Director`: the request it answers is gone
        if self.pending_approval_id != Some(message.correlation_id) {
            return Ok(out);
        }
        self.last_approval_decision = Some(message.decision);
        match message.decision {
            ApprovalDecision::Approved => {
                self.pending_approval_id = None;
                out.push(Outbound::Send(EditorialMessage::StartClassifyCommand(StartClassifyCommand { instance_id: self.instance_id })));
            }
            ApprovalDecision::Rejected => {
                self.pending_approval_id = None;
                self.phase = EditorialPhase::Failed;
                self.is_finished = true;
            }
            ApprovalDecision::Deferred => {}
        }
        Ok(out)
    }

    /// Escalate an approval that timed out (`DirectorApprovalTimedOut`)
    pub fn handle_director_approval_timed_out(&mut self, message: DirectorApprovalTimedOut, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        // Stale or duplicate signal for `Director`: the request it answers is gone
        if self.pending_approval_id != Some(message.correlation_id) {
            return Ok(out);
        }
        self.pending_approval_id = None;
        self.phase = EditorialPhase::Failed;
        self.is_finished = true;
        Ok(out)
    }

    /// Start a step (`StartClassifyCommand`)
    pub fn handle_start_classify_command(&mut self, message: StartClassifyCommand, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.phase = EditorialPhase::Classify;
        out.push(Outbound::Send(EditorialMessage::ExecuteClassifyWorkerCommand(ExecuteClassifyWorkerCommand { instance_id: self.instance_id, step: "Classify".to_string(), state: self.state.clone() })));
        Ok(out)
    }

    /// Merge a step's result and move on (`ClassifyCompleted`)
    pub fn handle_classify_completed(&mut self, message: ClassifyCompleted, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        let failure = message.failure;
        self.state = cx.reducer.reduce(&self.state, message.update);
        if failure.is_some() {
            self.phase = EditorialPhase::Failed;
        }
        if self.phase == EditorialPhase::Failed {
            if let Some(failure) = failure {
                out.push(Outbound::Send(EditorialMessage::StartFailureHandler_alertCommand(StartFailureHandler_alertCommand { instance_id: self.instance_id, failure: FailureContext::capture("Classify", &failure) })));
                return Ok(out);
            }
        }
        match discriminator_value(&self.state, "urgency").as_str() {
            "high" => {
                out.push(Outbound::Send(EditorialMessage::StartRush_ExpediteCommand(StartRush_ExpediteCommand { instance_id: self.instance_id })));
            }
            _ => {
                out.push(Outbound::Send(EditorialMessage::StartGatherCommand(StartGatherCommand { instance_id: self.instance_id })));
            }
        }
        Ok(out)
    }

    /// Start a step (`StartRush_ExpediteCommand`)
    pub fn handle_start_rush_expedite_command(&mut self, message: StartRush_ExpediteCommand, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.phase = EditorialPhase::Rush_Expedite;
        out.push(Outbound::Send(EditorialMessage::ExecuteRush_ExpediteWorkerCommand(ExecuteRush_ExpediteWorkerCommand { instance_id: self.instance_id, step: "Expedite".to_string(), state: self.state.clone() })));
        Ok(out)
    }

    /// Merge a step's result and move on (`Rush_ExpediteCompleted`)
    pub fn handle_rush_expedite_completed(&mut self, message: Rush_ExpediteCompleted, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        let failure = message.failure;
        self.state = cx.reducer.reduce(&self.state, message.update);
        if failure.is_some() {
            self.phase = EditorialPhase::Failed;
        }
        if self.phase == EditorialPhase::Failed {
            if let Some(failure) = failure {
                out.push(Outbound::Send(EditorialMessage::StartFailureHandler_alertCommand(StartFailureHandler_alertCommand { instance_id: self.instance_id, failure: FailureContext::capture("Rush_Expedite", &failure) })));
                return Ok(out);
            }
        }
        out.push(Outbound::Send(EditorialMessage::StartGatherCommand(StartGatherCommand { instance_id: self.instance_id })));
        Ok(out)
    }

    /// Start a step (`StartGatherCommand`)
    pub fn handle_start_gather_command(&mut self, message: StartGatherCommand, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.phase = EditorialPhase::Gather;
        out.push(Outbound::Send(EditorialMessage::ExecuteGatherWorkerCommand(ExecuteGatherWorkerCommand { instance_id: self.instance_id, step: "Gather".to_string(), state: self.state.clone() })));
        Ok(out)
    }

    /// Merge a step's result and move on (`GatherCompleted`)
    pub fn handle_gather_completed(&mut self, message: GatherCompleted, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        let failure = message.failure;
        self.state = cx.reducer.reduce(&self.state, message.update);
        if failure.is_some() {
            self.phase = EditorialPhase::Failed;
        }
        if self.phase == EditorialPhase::Failed {
            if let Some(failure) = failure {
                out.push(Outbound::Send(EditorialMessage::StartFailureHandler_alertCommand(StartFailureHandler_alertCommand { instance_id: self.instance_id, failure: FailureContext::capture("Gather", &failure) })));
                return Ok(out);
            }
        }
        out.push(Outbound::Send(EditorialMessage::StartFetchSalesCommand(StartFetchSalesCommand { instance_id: self.instance_id })));
        out.push(Outbound::Send(EditorialMessage::StartFetchCostsCommand(StartFetchCostsCommand { instance_id: self.instance_id })));
        Ok(out)
    }

    /// Start a step (`StartFetchSalesCommand`)
    pub fn handle_start_fetch_sales_command(&mut self, message: StartFetchSalesCommand, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.phase = EditorialPhase::FetchSales;
        out.push(Outbound::Send(EditorialMessage::ExecuteFetchSalesWorkerCommand(ExecuteFetchSalesWorkerCommand { instance_id: self.instance_id, step: "FetchSales".to_string(), state: self.state.clone() })));
        Ok(out)
    }

    /// Merge a step's result and move on (`FetchSalesCompleted`)
    pub fn handle_fetch_sales_completed(&mut self, message: FetchSalesCompleted, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        let failure = message.failure;
        self.state = cx.reducer.reduce(&self.state, message.update);
        if failure.is_some() {
            self.phase = EditorialPhase::Failed;
        }
        if self.phase == EditorialPhase::Failed {
            if let Some(failure) = failure {
                out.push(Outbound::Send(EditorialMessage::StartFailureHandler_alertCommand(StartFailureHandler_alertCommand { instance_id: self.instance_id, failure: FailureContext::capture("FetchSales", &failure) })));
                return Ok(out);
            }
        }
        out.push(Outbound::Join { fork: "Fork_Gather".to_string(), path: 0, of: 2, message: EditorialMessage::StartMergeCommand(StartMergeCommand { instance_id: self.instance_id }) });
        Ok(out)
    }

    /// Start a step (`StartFetchCostsCommand`)
    pub fn handle_start_fetch_costs_command(&mut self, message: StartFetchCostsCommand, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.phase = EditorialPhase::FetchCosts;
        out.push(Outbound::Send(EditorialMessage::ExecuteFetchCostsWorkerCommand(ExecuteFetchCostsWorkerCommand { instance_id: self.instance_id, step: "FetchCosts".to_string(), state: self.state.clone() })));
        Ok(out)
    }

    /// Merge a step's result and move on (`FetchCostsCompleted`)
    pub fn handle_fetch_costs_completed(&mut self, message: FetchCostsCompleted, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        let failure = message.failure;
        self.state = cx.reducer.reduce(&self.state, message.update);
        if failure.is_some() {
            self.phase = EditorialPhase::Failed;
        }
        if self.phase == EditorialPhase::Failed {
            if let Some(failure) = failure {
                out.push(Outbound::Send(EditorialMessage::StartFailureHandler_alertCommand(StartFailureHandler_alertCommand { instance_id: self.instance_id, failure: FailureContext::capture("FetchCosts", &failure) })));
                return Ok(out);
            }
        }
        out.push(Outbound::Join { fork: "Fork_Gather".to_string(), path: 1, of: 2, message: EditorialMessage::StartMergeCommand(StartMergeCommand { instance_id: self.instance_id }) });
        Ok(out)
    }

    /// Start a step (`StartMergeCommand`)
    pub fn handle_start_merge_command(&mut self, message: StartMergeCommand, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.phase = EditorialPhase::Merge;
        if !cx.conditions.evaluate("HasFigures", &self.state) {
            self.phase = EditorialPhase::ValidationFailed;
            out.push(Outbound::Send(EditorialMessage::MergeValidationFailed(MergeValidationFailed { instance_id: self.instance_id, step: "Merge".to_string(), message: "No figures gathered".to_string() })));
            return Ok(out);
        }
        out.push(Outbound::Send(EditorialMessage::ExecuteMergeWorkerCommand(ExecuteMergeWorkerCommand { instance_id: self.instance_id, step: "Merge".to_string(), state: self.state.clone() })));
        Ok(out)
    }

    /// Merge a step's result and move on (`MergeCompleted`)
    pub fn handle_merge_completed(&mut self, message: MergeCompleted, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        let failure = message.failure;
        self.state = cx.reducer.reduce(&self.state, message.update);
        if failure.is_some() {
            self.phase = EditorialPhase::Failed;
        }
        if self.phase == EditorialPhase::Failed {
            if let Some(failure) = failure {
                out.push(Outbound::Send(EditorialMessage::StartFailureHandler_alertCommand(StartFailureHandler_alertCommand { instance_id: self.instance_id, failure: FailureContext::capture("Merge", &failure) })));
                return Ok(out);
            }
        }
        self.phase = EditorialPhase::Completed;
        self.is_finished = true;
        Ok(out)
    }

    /// Capture a failure and start recovery (`StartFailureHandler_alertCommand`)
    pub fn handle_start_failure_handler_alert_command(&mut self, message: StartFailureHandler_alertCommand, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.failure_context = Some(message.failure);
        out.push(Outbound::Send(EditorialMessage::StartFailureHandler_alert_NotifyCommand(StartFailureHandler_alert_NotifyCommand { instance_id: self.instance_id })));
        Ok(out)
    }

    /// Start a step (`StartFailureHandler_alert_NotifyCommand`)
    pub fn handle_start_failure_handler_alert_notify_command(&mut self, message: StartFailureHandler_alert_NotifyCommand, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        self.phase = EditorialPhase::FailureHandler_alert_Notify;
        out.push(Outbound::Send(EditorialMessage::ExecuteFailureHandler_alert_NotifyWorkerCommand(ExecuteFailureHandler_alert_NotifyWorkerCommand { instance_id: self.instance_id, step: "Notify".to_string(), state: self.state.clone() })));
        Ok(out)
    }

    /// Merge a step's result and move on (`FailureHandler_alert_NotifyCompleted`)
    pub fn handle_failure_handler_alert_notify_completed(&mut self, message: FailureHandler_alert_NotifyCompleted, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        let mut out = Vec::new();
        let failure = message.failure;
        self.state = cx.reducer.reduce(&self.state, message.update);
        if failure.is_some() {
            self.phase = EditorialPhase::Failed;
        }
        if self.phase == EditorialPhase::Failed {
            if let Some(failure) = failure {
                return Err(ProcessError::StepFailed { step: "FailureHandler_alert_Notify".to_string(), failure });
            }
        }
        self.phase = EditorialPhase::Failed;
        self.is_finished = true;
        Ok(out)
    }

    /// Route a message to its transition
    pub fn handle(&mut self, message: EditorialMessage, cx: &Collaborators<'_, State>) -> Result<Vec<Outbound<EditorialMessage>>, ProcessError> {
        match message {
            EditorialMessage::StartDraftCommand(message) => self.handle_start_draft_command(message, cx),
            EditorialMessage::DraftCompleted(message) => self.handle_draft_completed(message, cx),
            EditorialMessage::StartReviewCommand(message) => self.handle_start_review_command(message, cx),
            EditorialMessage::ReviewCompleted(message) => self.handle_review_completed(message, cx),
            EditorialMessage::EditorApprovalPending(message) => self.handle_editor_approval_pending(message, cx),
            EditorialMessage::EditorApprovalDecided(message) => self.handle_editor_approval_decided(message, cx),
            EditorialMessage::EditorApprovalTimedOut(message) => self.handle_editor_approval_timed_out(message, cx),
            EditorialMessage::DirectorApprovalPending(message) => self.handle_director_approval_pending(message, cx),
            EditorialMessage::DirectorApprovalDecided(message) => self.handle_director_approval_decided(message, cx),
            EditorialMessage::DirectorApprovalTimedOut(message) => self.handle_director_approval_timed_out(message, cx),
            EditorialMessage::StartClassifyCommand(message) => self.handle_start_classify_command(message, cx),
            EditorialMessage::ClassifyCompleted(message) => self.handle_classify_completed(message, cx),
            EditorialMessage::StartRush_ExpediteCommand(message) => self.handle_start_rush_expedite_command(message, cx),
            EditorialMessage::Rush_ExpediteCompleted(message) => self.handle_rush_expedite_completed(message, cx),
            EditorialMessage::StartGatherCommand(message) => self.handle_start_gather_command(message, cx),
            EditorialMessage::GatherCompleted(message) => self.handle_gather_completed(message, cx),
            EditorialMessage::StartFetchSalesCommand(message) => self.handle_start_fetch_sales_command(message, cx),
            EditorialMessage::FetchSalesCompleted(message) => self.handle_fetch_sales_completed(message, cx),
            EditorialMessage::StartFetchCostsCommand(message) => self.handle_start_fetch_costs_command(message, cx),
            EditorialMessage::FetchCostsCompleted(message) => self.handle_fetch_costs_completed(message, cx),
            EditorialMessage::StartMergeCommand(message) => self.handle_start_merge_command(message, cx),
            EditorialMessage::MergeCompleted(message) => self.handle_merge_completed(message, cx),
            EditorialMessage::StartFailureHandler_alertCommand(message) => self.handle_start_failure_handler_alert_command(message, cx),
            EditorialMessage::StartFailureHandler_alert_NotifyCommand(message) => self.handle_start_failure_handler_alert_notify_command(message, cx),
            EditorialMessage::FailureHandler_alert_NotifyCompleted(message) => self.handle_failure_handler_alert_notify_completed(message, cx),
            other => Err(ProcessError::UnexpectedMessage(other.name().to_string())),
        }
    }

    /// Record a message whose instance no longer exists
    pub fn not_found(message: &EditorialMessage) -> Option<NotFound> {
        let kind = match message {
            EditorialMessage::StartDraftCommand(_) | EditorialMessage::StartReviewCommand(_) | EditorialMessage::StartClassifyCommand(_) | EditorialMessage::StartRush_ExpediteCommand(_) | EditorialMessage::StartGatherCommand(_) | EditorialMessage::StartFetchSalesCommand(_) | EditorialMessage::StartFetchCostsCommand(_) | EditorialMessage::StartMergeCommand(_) | EditorialMessage::StartFailureHandler_alert_NotifyCommand(_) => "start_step",
            EditorialMessage::DraftCompleted(_) | EditorialMessage::ReviewCompleted(_) | EditorialMessage::ClassifyCompleted(_) | EditorialMessage::Rush_ExpediteCompleted(_) | EditorialMessage::GatherCompleted(_) | EditorialMessage::FetchSalesCompleted(_) | EditorialMessage::FetchCostsCompleted(_) | EditorialMessage::MergeCompleted(_) | EditorialMessage::FailureHandler_alert_NotifyCompleted(_) => "step_completed",
            EditorialMessage::EditorApprovalPending(_) | EditorialMessage::DirectorApprovalPending(_) => "approval_pending",
            EditorialMessage::EditorApprovalDecided(_) | EditorialMessage::DirectorApprovalDecided(_) => "approval_decided",
            EditorialMessage::EditorApprovalTimedOut(_) | EditorialMessage::DirectorApprovalTimedOut(_) => "approval_timed_out",
            EditorialMessage::StartFailureHandler_alertCommand(_) => "failure_trigger",
            _ => return None,
        };
        Some(NotFound::new(kind, message.name(), message.instance_id()))
    }
}
