//! Version control access.
//!
//! The backport flow drives git through the [`Vcs`] trait; [`GitCli`] shells
//! out to the `git` binary inside one checkout and [`DryRunVcs`] leaves the
//! checkout alone.

mod dry_run;
mod error;
mod git;

pub use dry_run::DryRunVcs;
pub use error::VcsError;
pub use git::GitCli;

use async_trait::async_trait;
use bstr::ByteSlice;

/// The start point `git fetch` leaves behind for the last fetched ref.
pub const FETCH_HEAD: &str = "FETCH_HEAD";

/// Result of applying a commit with `git cherry-pick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CherryPickResult {
    /// The commit applied cleanly and a new commit was recorded.
    Applied,
    /// git stopped with conflicts; the working tree is mid-operation.
    Conflicted,
}

/// Operations on the one checkout owned by the current attempt.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Fetches `refspec` from `remote` with a shallow `depth`.
    async fn fetch(&self, remote: &str, refspec: &str, depth: u32) -> Result<(), VcsError>;

    /// Creates and checks out `branch` at `start_point`.
    async fn checkout_new_branch(&self, branch: &str, start_point: &str) -> Result<(), VcsError>;

    /// Applies `sha` onto the current branch.
    ///
    /// A conflict is reported as [`CherryPickResult::Conflicted`], not as an error.
    async fn cherry_pick(&self, sha: &str) -> Result<CherryPickResult, VcsError>;

    /// Abandons an in-progress cherry-pick.
    async fn abort_cherry_pick(&self) -> Result<(), VcsError>;

    /// Pushes `branch` to `remote` and sets it as upstream.
    async fn push(&self, remote: &str, branch: &str) -> Result<(), VcsError>;

    /// Returns true when the working tree has no uncommitted changes.
    async fn is_clean(&self) -> Result<bool, VcsError>;
}

/// Checks that `name` can be used as a branch name.
///
/// # Errors
///
/// Returns [`VcsError::InvalidBranchName`] if git would reject the name.
pub fn validate_branch_name(name: &str) -> Result<(), VcsError> {
    gix_validate::reference::name_partial(name.as_bytes().as_bstr())
        .map(|_| ())
        .map_err(|e| VcsError::InvalidBranchName {
            name: name.to_string(),
            message: e.to_string(),
        })
}
