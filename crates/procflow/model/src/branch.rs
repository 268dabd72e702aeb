//! Exclusive branches: route on a discriminator to one of several paths

use crate::StepModel;
use serde::{Deserialize, Serialize};

/// An exclusive branch taken after a main-line step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchModel {
    /// Branch identifier
    pub id: String,
    /// The step whose completion routes into the branch
    pub previous_step: String,
    /// What the branch switches on
    pub discriminator: DiscriminatorModel,
    /// Step at which non-terminal paths reconverge; absent completes the process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejoin_step: Option<String>,
    /// Prefix of the enclosing loop, when the branch lives inside a loop body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_prefix: Option<String>,
    /// Cases in declaration order
    pub cases: Vec<BranchCaseModel>,
}

impl BranchModel {
    pub fn new(
        id: impl Into<String>,
        previous_step: impl Into<String>,
        discriminator: DiscriminatorModel,
    ) -> Self {
        Self {
            id: id.into(),
            previous_step: previous_step.into(),
            discriminator,
            rejoin_step: None,
            loop_prefix: None,
            cases: Vec::new(),
        }
    }

    pub fn with_rejoin(mut self, step: impl Into<String>) -> Self {
        self.rejoin_step = Some(step.into());
        self
    }

    pub fn with_loop_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.loop_prefix = Some(prefix.into());
        self
    }

    pub fn with_case(mut self, case: BranchCaseModel) -> Self {
        self.cases.push(case);
        self
    }

    /// The catch-all case, if declared
    pub fn otherwise(&self) -> Option<&BranchCaseModel> {
        self.cases.iter().find(|c| c.value.is_otherwise())
    }

    /// Cases carrying a literal value, in declaration order
    pub fn literal_cases(&self) -> impl Iterator<Item = (&str, &BranchCaseModel)> {
        self.cases.iter().filter_map(|c| match &c.value {
            CaseValue::Literal(value) => Some((value.as_str(), c)),
            CaseValue::Otherwise => None,
        })
    }

    /// Select the case a discriminator value routes to
    pub fn select(&self, value: &str) -> Option<&BranchCaseModel> {
        self.literal_cases()
            .find(|(literal, _)| *literal == value)
            .map(|(_, case)| case)
            .or_else(|| self.otherwise())
    }
}

/// The value a branch switches on
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscriminatorModel {
    /// Dotted path into the process state
    pub field_path: String,
    /// Type name of the discriminator
    pub type_name: String,
    /// Enumerated or computed value
    pub kind: DiscriminatorKind,
    /// Closed set of values, when known up front
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
}

impl DiscriminatorModel {
    /// A discriminator over an enumerated type
    pub fn enumerated(field_path: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            type_name: type_name.into(),
            kind: DiscriminatorKind::Enumerated,
            domain: Vec::new(),
        }
    }

    /// A discriminator computed from state (strings, numbers, derived values)
    pub fn computed(field_path: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            type_name: type_name.into(),
            kind: DiscriminatorKind::Computed,
            domain: Vec::new(),
        }
    }

    /// Declare the closed set of values the discriminator can take
    pub fn with_domain<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_enumerated(&self) -> bool {
        self.kind == DiscriminatorKind::Enumerated
    }
}

/// How the discriminator value is obtained
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscriminatorKind {
    Enumerated,
    Computed,
}

/// One case of a branch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCaseModel {
    /// Literal value or the catch-all marker
    pub value: CaseValue,
    /// Prefix applied to this path's step identifiers
    pub path_prefix: String,
    /// Steps of this path, in order
    pub steps: Vec<StepModel>,
    /// Terminal paths end the process instead of rejoining
    pub is_terminal: bool,
}

impl BranchCaseModel {
    /// A case matching a literal value
    pub fn when(value: impl Into<String>, path_prefix: impl Into<String>) -> Self {
        Self {
            value: CaseValue::Literal(value.into()),
            path_prefix: path_prefix.into(),
            steps: Vec::new(),
            is_terminal: false,
        }
    }

    /// The catch-all case
    pub fn otherwise(path_prefix: impl Into<String>) -> Self {
        Self {
            value: CaseValue::Otherwise,
            path_prefix: path_prefix.into(),
            steps: Vec::new(),
            is_terminal: false,
        }
    }

    pub fn step(mut self, step: impl Into<StepModel>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn terminal(mut self) -> Self {
        self.is_terminal = true;
        self
    }

    pub fn last_step(&self) -> Option<&StepModel> {
        self.steps.last()
    }
}

/// A case value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseValue {
    Literal(String),
    Otherwise,
}

impl CaseValue {
    pub fn is_otherwise(&self) -> bool {
        matches!(self, CaseValue::Otherwise)
    }
}

impl std::fmt::Display for CaseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseValue::Literal(value) => write!(f, "{}", value),
            CaseValue::Otherwise => write!(f, "otherwise"),
        }
    }
}
