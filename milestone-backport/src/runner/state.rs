//! Run-level states, logged on every transition.

use std::fmt;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    LocatingCommit,
    FailedNoCommit,
    FailedNoMilestone,
    ResolvingMilestones,
    FailedNoMilestones,
    FanningOut,
    Reporting,
    Done,
}

impl RunState {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::LocatingCommit => "LOCATING_COMMIT",
            Self::FailedNoCommit => "FAILED_NO_COMMIT",
            Self::FailedNoMilestone => "FAILED_NO_MILESTONE",
            Self::ResolvingMilestones => "RESOLVING_MILESTONES",
            Self::FailedNoMilestones => "FAILED_NO_MILESTONES",
            Self::FanningOut => "FANNING_OUT",
            Self::Reporting => "REPORTING",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
