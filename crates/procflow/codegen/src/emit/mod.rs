//! Component emitters
//!
//! Each emitter is a stateless function over the model and the emission
//! context, responsible for one slice of the compiled process. Emitters
//! may consult one another: the step emitter delegates to the loop,
//! branch, approval, fork and failure emitters for the attachments a
//! step carries.

pub mod approval;
pub mod branch;
pub mod conditions;
pub mod failure;
pub mod fields;
pub mod fork;
pub mod loops;
pub mod not_found;
pub mod start;
pub mod step;
