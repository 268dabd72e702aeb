//! Parallel fork/join sections

use crate::StepModel;
use serde::{Deserialize, Serialize};

/// A parallel section started after a main-line step and joined at another
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkModel {
    /// Step whose completion starts every path
    pub previous_step: String,
    /// Parallel paths, in declaration order
    pub paths: Vec<ForkPathModel>,
    /// Cancel sibling paths on the first path failure
    pub fail_fast: bool,
    /// Main-line step started once every path has completed
    pub join_step: String,
}

impl ForkModel {
    pub fn new(previous_step: impl Into<String>, join_step: impl Into<String>) -> Self {
        Self {
            previous_step: previous_step.into(),
            paths: Vec::new(),
            fail_fast: false,
            join_step: join_step.into(),
        }
    }

    pub fn with_path(mut self, path: ForkPathModel) -> Self {
        self.paths.push(path);
        self
    }

    pub fn fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }
}

/// One parallel path: an ordered run of steps
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkPathModel {
    pub steps: Vec<StepModel>,
}

impl ForkPathModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: impl Into<StepModel>) -> Self {
        self.steps.push(step.into());
        self
    }
}

impl<S: Into<StepModel>> FromIterator<S> for ForkPathModel {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().map(Into::into).collect(),
        }
    }
}
