//! Steps: the units of business work a process sequences
//!
//! A step names the work unit the step executor runs. The same work unit
//! may appear more than once (for example on two fork paths), in which case
//! each occurrence carries an instance name to keep identifiers distinct.

use serde::{Deserialize, Serialize};

/// A single step of a process
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepModel {
    /// Step name as authored
    pub name: String,
    /// The work-unit type the step executor runs
    pub work_type: String,
    /// Distinguishes reuses of the same step within one scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    /// Predicate that must hold before the step may run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationModel>,
}

impl StepModel {
    /// Create a step whose work-unit type matches its name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            work_type: name.clone(),
            name,
            instance_name: None,
            validation: None,
        }
    }

    pub fn with_work_type(mut self, work_type: impl Into<String>) -> Self {
        self.work_type = work_type.into();
        self
    }

    pub fn with_instance_name(mut self, instance_name: impl Into<String>) -> Self {
        self.instance_name = Some(instance_name.into());
        self
    }

    pub fn with_validation(
        mut self,
        condition_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.validation = Some(ValidationModel {
            condition_id: condition_id.into(),
            message: message.into(),
        });
        self
    }

    /// The identifier used for phases and messages
    pub fn identifier(&self) -> &str {
        self.instance_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether the step may refuse to execute
    pub fn is_validated(&self) -> bool {
        self.validation.is_some()
    }
}

impl From<&str> for StepModel {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for StepModel {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// A validation predicate evaluated through the condition registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationModel {
    /// Condition identifier looked up at run time
    pub condition_id: String,
    /// Message reported when the predicate fails
    pub message: String,
}

/// Check that a name can be used verbatim as a generated identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
