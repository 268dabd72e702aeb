//! # procflow-codegen
//!
//! **Process Compiler** for Procflow.
//!
//! Lowers a validated `ProcessModel` into a message-driven state machine:
//! a phase enumeration, one message type per command and event, an
//! instance record, and one transition per inbound message. The result
//! is available both as a transition table (`CompiledProcess`) and as
//! rendered Rust source.
//!
//! ## Architecture
//!
//! ```text
//! ProcessModel (validated)
//!     │
//!     ▼
//! ProcessCompiler
//!     │─── build EmissionContext (indices, emission plan, name claims)
//!     │─── fields, conditions, start factory
//!     │─── per plan entry: step / approval / failure-handler transitions
//!     │─── fork layouts, not-found fallbacks
//!     ▼
//! CompiledProcess ──render──▶ GeneratedSource
//! ```
//!
//! ## Design Principles
//!
//! 1. Deterministic: the same model and configuration always produce the
//!    same table and byte-identical source.
//! 2. Names are derived, never chosen: every identifier follows from the
//!    model through the `naming` rules, and collisions are compile errors.
//! 3. Emitters are stateless functions over the emission context.

#![deny(unsafe_code)]

pub mod compiler;
pub mod config;
pub mod context;
pub mod emit;
pub mod error;
pub mod ir;
pub mod naming;
pub mod render;

// Re-exports
pub use compiler::{GeneratedSource, ProcessCompiler};
pub use config::CompilerConfig;
pub use error::{CodegenError, CodegenResult};
pub use ir::{
    ApprovalRequest, BranchRoute, CompiledProcess, ConditionCheck, Continuation, Discriminator,
    FailureRoute, FieldDef, FieldKind, ForkFailure, ForkLayout, ForkPathLayout, JoinTarget,
    LoopControl, MessageDef, MessageKind, NotFoundFallback, Op, ResumeTarget, RouteArm,
    Transition, TransitionKind, ValidationGuard,
};
