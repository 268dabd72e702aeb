//! # procflow-engine
//!
//! **Run-time contract and reference host** for compiled Procflow processes.
//!
//! Generated process source links against [`contract`]: the collaborator
//! traits (state reducer, condition registry, step executor), the outbound
//! effect type and the failure, approval and not-found payloads. The rest
//! of the crate is an in-memory host that interprets a `CompiledProcess`
//! directly, with the exact semantics the generated source has.
//!
//! ## Architecture
//!
//! ```text
//! ProcessModel ──ProcessCompiler──▶ CompiledProcess
//!                                        │
//!                                        ▼
//! ProcessHost ── FIFO queue ──▶ machine::apply(transition, instance)
//!     │── StepExecutor (worker commands)
//!     │── StateReducer / ConditionRegistry (collaborators)
//!     │── fork join counting, fail-fast cancellation
//!     │── simulated approval service (correlation ids)
//!     ▼
//! instances, events, dead letters, faults
//! ```
//!
//! ## Design Principles
//!
//! 1. One transition at a time per instance, in delivery order.
//! 2. A transition is committed only when it succeeds; errors land in the
//!    fault log with the instance untouched.
//! 3. Messages for vanished instances are recorded, never raised.

#![deny(unsafe_code)]

pub mod conditions;
pub mod contract;
pub mod error;
pub mod executor;
pub mod host;
pub mod instance;
pub mod machine;
pub mod message;
pub mod reducer;

// Re-exports
pub use conditions::ConditionTable;
pub use contract::{
    discriminator_value, ApprovalDecision, Collaborators, ConditionRegistry, CorrelationId,
    FailureContext, InstanceId, NotFound, Outbound, ProcessError, StateReducer, StepExecutor,
    StepFailure,
};
pub use error::{EngineError, EngineResult};
pub use executor::SimulatedExecutor;
pub use host::{ApprovalRecord, Fault, ProcessHost, DEFAULT_DELIVERY_LIMIT};
pub use instance::ProcessInstance;
pub use message::{Message, MessageBody};
pub use reducer::{FieldPolicy, FieldPolicyReducer};
