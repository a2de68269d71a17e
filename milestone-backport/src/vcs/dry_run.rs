//! Checkout wrapper that logs git mutations instead of performing them.

use super::{CherryPickResult, Vcs, VcsError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Forwards fetches and status checks; branch, cherry-pick and push only log.
///
/// Fetching leaves the working tree and local branches untouched, so it still
/// runs and a missing milestone branch is reported as in a real run.
pub struct DryRunVcs {
    inner: Arc<dyn Vcs>,
}

impl DryRunVcs {
    pub fn new(inner: Arc<dyn Vcs>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Vcs for DryRunVcs {
    async fn fetch(&self, remote: &str, refspec: &str, depth: u32) -> Result<(), VcsError> {
        self.inner.fetch(remote, refspec, depth).await
    }

    async fn checkout_new_branch(&self, branch: &str, start_point: &str) -> Result<(), VcsError> {
        info!(branch, start_point, "[DRY RUN] Would git checkout -b");
        Ok(())
    }

    async fn cherry_pick(&self, sha: &str) -> Result<CherryPickResult, VcsError> {
        info!(sha, "[DRY RUN] Would git cherry-pick");
        Ok(CherryPickResult::Applied)
    }

    async fn abort_cherry_pick(&self) -> Result<(), VcsError> {
        info!("[DRY RUN] Would git cherry-pick --abort");
        Ok(())
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        info!(remote, branch, "[DRY RUN] Would git push");
        Ok(())
    }

    async fn is_clean(&self) -> Result<bool, VcsError> {
        self.inner.is_clean().await
    }
}
