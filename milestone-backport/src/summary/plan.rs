//! Milestone plans for job-matrix runs.

use super::outcome::RunOutcome;
use serde::Serialize;

/// The milestones a pull request should be backported to.
///
/// Printed as JSON so a CI job matrix can run one unit per milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPlan {
    /// Source pull request number.
    pub pr_number: u64,

    /// [`RunOutcome::Done`] when milestones were resolved.
    pub outcome: RunOutcome,

    /// Milestones in ascending order. Empty when resolution failed.
    pub milestones: Vec<String>,
}

impl RunPlan {
    /// True when there is at least one milestone to backport to.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.outcome == RunOutcome::Done && !self.milestones.is_empty()
    }
}
