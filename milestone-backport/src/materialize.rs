//! Branch materialization.
//!
//! Prepares the local branch a backport is applied on: the milestone head is
//! fetched shallowly, the merge commit is fetched with its parent so git can
//! compute its diff, and the deterministic branch is created at the
//! milestone head.

use crate::context::BackportContext;
use crate::locator::SourcePullRequest;
use crate::vcs::{validate_branch_name, VcsError, FETCH_HEAD};
use tracing::{debug, info};

/// History needed to cherry-pick a commit: the commit and its parent.
const SOURCE_COMMIT_DEPTH: u32 = 2;

/// Only the tip of the milestone branch is needed as a base.
const MILESTONE_DEPTH: u32 = 1;

/// Creates `branch_name` at the head of `milestone`.
///
/// # Errors
///
/// Returns [`VcsError`] if either fetch fails or the branch can't be created.
/// Callers treat this as a failure of this milestone only.
pub async fn materialize(
    ctx: &BackportContext,
    source: &SourcePullRequest,
    milestone: &str,
    branch_name: &str,
) -> Result<(), VcsError> {
    validate_branch_name(branch_name)?;

    let remote = &ctx.config().remote;
    let vcs = ctx.vcs();

    debug!(sha = %source.merge_commit_sha, "Fetching source commit");
    vcs.fetch(remote, &source.merge_commit_sha, SOURCE_COMMIT_DEPTH)
        .await?;

    // Fetched last so FETCH_HEAD points at the milestone head.
    debug!(remote = %remote, "Fetching milestone branch");
    vcs.fetch(remote, milestone, MILESTONE_DEPTH).await?;

    vcs.checkout_new_branch(branch_name, FETCH_HEAD).await?;
    info!(branch = %branch_name, "Materialized backport branch");
    Ok(())
}
