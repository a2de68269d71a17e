//! Run summary types.

use super::outcome::RunOutcome;
use crate::attempt::{AttemptOutcome, BackportAttempt};
use serde::Serialize;

/// Summary of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Source pull request number.
    pub pr_number: u64,

    /// How the run ended.
    pub outcome: RunOutcome,

    /// Attempts in milestone order. Empty unless the run fanned out.
    pub attempts: Vec<BackportAttempt>,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a summary for a run that stopped before fanning out.
    #[must_use]
    pub fn halted(pr_number: u64, outcome: RunOutcome, dry_run: bool) -> Self {
        Self {
            pr_number,
            outcome,
            attempts: Vec::new(),
            dry_run,
        }
    }

    /// Creates a summary for a run that attempted `attempts`.
    #[must_use]
    pub fn done(pr_number: u64, attempts: Vec<BackportAttempt>, dry_run: bool) -> Self {
        Self {
            pr_number,
            outcome: RunOutcome::Done,
            attempts,
            dry_run,
        }
    }

    /// Number of attempts with an open backport pull request.
    #[must_use]
    pub fn published(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, AttemptOutcome::Published { .. }))
            .count()
    }

    /// Number of attempts that need a human.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome.is_failure())
            .count()
    }

    /// Returns true if the run halted or any attempt failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcome.is_resolution_failure() || self.failed() > 0
    }

    /// Returns true if every attempt was published.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures() && self.published() == self.attempts.len()
    }
}
