//! Compiler error types.

use procflow_model::ModelError;
use thiserror::Error;

/// Errors that can occur while compiling a process model.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The model failed structural validation.
    #[error("Invalid process model: {0}")]
    InvalidModel(#[from] ModelError),

    /// Two constructs would generate the same name.
    #[error("Generated identifier '{name}' is produced by both {first} and {second}")]
    DuplicateIdentifier {
        name: String,
        first: String,
        second: String,
    },

    /// Lowering reached a construct it cannot express.
    #[error("Code generation failed: {0}")]
    Generation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for compiler operations.
pub type CodegenResult<T> = Result<T, CodegenError>;
