//! Cherry-pick execution.

use crate::attempt::AttemptOutcome;
use crate::context::BackportContext;
use crate::locator::SourcePullRequest;
use crate::vcs::{CherryPickResult, VcsError};
use tracing::{info, warn};

/// Applies the source commit onto the checked-out backport branch.
///
/// Returns [`AttemptOutcome::Applied`] or [`AttemptOutcome::Conflicted`]. A
/// conflicted checkout is left mid-operation for a human to resolve.
///
/// # Errors
///
/// Returns [`VcsError`] only if git could not be run at all.
pub async fn apply(
    ctx: &BackportContext,
    source: &SourcePullRequest,
) -> Result<AttemptOutcome, VcsError> {
    match ctx.vcs().cherry_pick(&source.merge_commit_sha).await? {
        CherryPickResult::Applied => {
            info!(sha = %source.merge_commit_sha, "Cherry-pick applied");
            Ok(AttemptOutcome::Applied)
        }
        CherryPickResult::Conflicted => {
            warn!(sha = %source.merge_commit_sha, "Cherry-pick conflicted");
            Ok(AttemptOutcome::Conflicted)
        }
    }
}

/// Clears a conflicted cherry-pick so the checkout can host the next attempt.
///
/// Failure to abort is logged, not returned: the next attempt will then fail
/// to materialize and be reported on its own.
pub async fn release_checkout(ctx: &BackportContext) {
    if let Err(e) = ctx.vcs().abort_cherry_pick().await {
        warn!(error = %e, "Failed to abort conflicted cherry-pick");
    }
}
