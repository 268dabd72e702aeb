//! Compiler configuration

use crate::error::{CodegenError, CodegenResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options controlling generated source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Module path of the run-time contract the generated code links against
    pub runtime_path: String,

    /// Spaces per indentation level
    pub indent_width: usize,

    /// Derive serde traits on generated types
    pub serde_derives: bool,

    /// Emit doc comments on generated items
    pub doc_comments: bool,

    /// State type used when the model declares none
    pub default_state_type: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            runtime_path: "procflow_engine::contract".into(),
            indent_width: 4,
            serde_derives: true,
            doc_comments: true,
            default_state_type: "serde_json::Value".into(),
        }
    }
}

impl CompilerConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> CodegenResult<Self> {
        let config: CompilerConfig =
            toml::from_str(contents).map_err(|e| CodegenError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> CodegenResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No compiler config found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_serde_derives(mut self, enabled: bool) -> Self {
        self.serde_derives = enabled;
        self
    }

    pub fn with_doc_comments(mut self, enabled: bool) -> Self {
        self.doc_comments = enabled;
        self
    }

    fn validate(&self) -> CodegenResult<()> {
        if self.indent_width == 0 || self.indent_width > 8 {
            return Err(CodegenError::Config(format!(
                "indent_width must be between 1 and 8, got {}",
                self.indent_width
            )));
        }
        if self.runtime_path.trim().is_empty() {
            return Err(CodegenError::Config("runtime_path must not be empty".into()));
        }
        if self.default_state_type.trim().is_empty() {
            return Err(CodegenError::Config(
                "default_state_type must not be empty".into(),
            ));
        }
        Ok(())
    }
}
