use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Assessment phases, in the only order a session may move through them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Profiling,
    PackageSelected,
    Testing,
    Evaluation,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("operation requires phase '{expected}', session is in '{actual}'")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("cannot move from '{from}' back to '{to}'")]
    Regression { from: Phase, to: Phase },

    #[error("session is already in '{0}'")]
    Unchanged(Phase),

    #[error("cannot skip from '{from}' to '{to}'")]
    Skipped { from: Phase, to: Phase },
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Profiling => "profiling",
            Phase::PackageSelected => "package_selected",
            Phase::Testing => "testing",
            Phase::Evaluation => "evaluation",
            Phase::Completed => "completed",
        }
    }

    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Profiling => Some(Phase::PackageSelected),
            Phase::PackageSelected => Some(Phase::Testing),
            Phase::Testing => Some(Phase::Evaluation),
            Phase::Evaluation => Some(Phase::Completed),
            Phase::Completed => None,
        }
    }

    /// Fails unless the session is exactly in `expected`.
    pub fn require(&self, expected: Phase) -> Result<(), PhaseError> {
        if *self == expected {
            Ok(())
        } else {
            Err(PhaseError::WrongPhase {
                expected,
                actual: *self,
            })
        }
    }

    /// Moves one step forward to `target`. A target at or before the
    /// current phase, or more than one step ahead, is rejected.
    pub fn advance_to(&mut self, target: Phase) -> Result<(), PhaseError> {
        if target == *self {
            return Err(PhaseError::Unchanged(target));
        }
        if target < *self {
            return Err(PhaseError::Regression {
                from: *self,
                to: target,
            });
        }
        if self.next() != Some(target) {
            return Err(PhaseError::Skipped {
                from: *self,
                to: target,
            });
        }
        *self = target;
        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
