//! Terminal states of a run.

use serde::Serialize;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The source pull request has no merge commit.
    FailedNoCommit,

    /// The source pull request has no milestone.
    FailedNoMilestone,

    /// The source milestone is not open, so there is nothing to backport to.
    FailedNoMilestones,

    /// Every relevant milestone was attempted and reported.
    Done,
}

impl RunOutcome {
    /// True when the run stopped before attempting any milestone.
    #[must_use]
    pub fn is_resolution_failure(self) -> bool {
        !matches!(self, Self::Done)
    }
}
