//! Process Model for Procflow
//!
//! A process is an ordered main line of steps with optional attachments
//! that shape its control flow. The model is pure data: it describes the
//! process, the compiler turns it into a message-driven state machine.
//!
//! # Key Concepts
//!
//! - **ProcessModel**: The immutable blueprint. Built once via
//!   `ProcessBuilder`, validated, then handed to the compiler.
//! - **StepModel**: One unit of work, optionally guarded by a validation
//!   predicate.
//! - **LoopModel**: A bounded loop over a contiguous run of main-line
//!   steps. Loops nest by naming a parent.
//! - **BranchModel**: An exclusive choice on a discriminator value, with
//!   an optional catch-all case and an optional rejoin step.
//! - **ApprovalModel**: A human approval gate with escalation on timeout
//!   and an optional rejection chain.
//! - **ForkModel**: Parallel paths joined at a later main-line step.
//! - **FailureHandlerModel**: A recovery chain, process-wide or bound to
//!   one step.
//!
//! # Design Principles
//!
//! 1. Models are immutable once built. Nothing downstream mutates them.
//! 2. Structural mistakes are caught at construction, never at run time.
//! 3. Attachments reference main-line steps by identifier.

#![deny(unsafe_code)]

mod approval;
mod branch;
mod errors;
mod failure;
mod fork;
mod loops;
mod process;
mod step;
mod validator;

pub use approval::*;
pub use branch::*;
pub use errors::*;
pub use failure::*;
pub use fork::*;
pub use loops::*;
pub use process::*;
pub use step::*;
pub use validator::validate;
