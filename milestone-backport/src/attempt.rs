//! Per-milestone backport attempts and their outcomes.

use serde::Serialize;

/// Name of the branch carrying the backport of `pr_number` to `milestone`.
///
/// The same name is used to create the branch and later to find the pull
/// request opened from it.
#[must_use]
pub fn branch_name(pr_number: u64, milestone: &str) -> String {
    format!("cherry-pick-{pr_number}-to-{milestone}")
}

/// Where a single backport attempt ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Not yet run.
    Pending,

    /// The milestone branch (or the source commit) could not be fetched, or
    /// the local branch could not be created.
    BranchFetchFailed {
        /// What went wrong.
        reason: String,
    },

    /// The commit applied cleanly; not yet published.
    Applied,

    /// The commit did not apply; the checkout needs manual resolution.
    Conflicted,

    /// The commit applied but pushing or opening the pull request failed.
    PublishFailed {
        /// What went wrong.
        reason: String,
    },

    /// A backport pull request is open.
    Published {
        /// Pull request number.
        number: u64,
        /// Pull request URL.
        url: String,
        /// True when the pull request already existed from an earlier run.
        reused: bool,
    },
}

impl AttemptOutcome {
    /// Returns the outcome as a short string for logs and templates.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::BranchFetchFailed { .. } => "branch_fetch_failed",
            Self::Applied => "applied",
            Self::Conflicted => "conflicted",
            Self::PublishFailed { .. } => "publish_failed",
            Self::Published { .. } => "published",
        }
    }

    /// True once no further step will change the outcome.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Applied)
    }

    /// True for terminal outcomes that need a human.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::BranchFetchFailed { .. } | Self::Conflicted | Self::PublishFailed { .. }
        )
    }

    /// Returns the backport pull request URL if published.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Published { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// One backport of the source pull request onto one milestone branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackportAttempt {
    /// Milestone title, which is also the target branch name.
    pub milestone: String,

    /// Deterministic local and remote branch name.
    pub branch_name: String,

    /// Current outcome.
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

impl BackportAttempt {
    /// Starts a pending attempt.
    #[must_use]
    pub fn new(pr_number: u64, milestone: &str) -> Self {
        Self {
            milestone: milestone.to_string(),
            branch_name: branch_name(pr_number, milestone),
            outcome: AttemptOutcome::Pending,
        }
    }
}
