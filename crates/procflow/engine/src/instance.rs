//! Process instance record

use crate::contract::{ApprovalDecision, CorrelationId, FailureContext, InstanceId};
use procflow_codegen::naming::PHASE_NOT_STARTED;
use procflow_codegen::{CompiledProcess, FieldKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One running instance, holding the same fields the generated process
/// struct declares
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessInstance {
    pub id: InstanceId,
    pub process: String,
    pub state: Value,
    pub phase: String,
    pub is_finished: bool,
    pub pending_approval_id: Option<CorrelationId>,
    pub last_approval_decision: Option<ApprovalDecision>,
    /// Iteration counters by generated field name
    pub counters: BTreeMap<String, u32>,
    pub failure_context: Option<FailureContext>,
}

impl ProcessInstance {
    /// A fresh instance in `NotStarted`, counters at zero
    pub fn initialize(compiled: &CompiledProcess, id: InstanceId, state: Value) -> Self {
        let counters = compiled
            .fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::IterationCounter { .. }))
            .map(|f| (f.name.clone(), 0))
            .collect();
        Self {
            id,
            process: compiled.process.clone(),
            state,
            phase: PHASE_NOT_STARTED.to_string(),
            is_finished: false,
            pending_approval_id: None,
            last_approval_decision: None,
            counters,
            failure_context: None,
        }
    }

    pub fn counter(&self, name: &str) -> u32 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn is_in(&self, phase: &str) -> bool {
        self.phase == phase
    }
}
