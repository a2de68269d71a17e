//! Read-through forge that logs writes instead of performing them.

use super::{Forge, ForgeError, MilestoneRecord, NewPullRequest, OpenPullRequest, PullRequestRecord};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Forwards reads to the wrapped forge and only logs mutations.
pub struct DryRunForge {
    inner: Arc<dyn Forge>,
}

impl DryRunForge {
    pub fn new(inner: Arc<dyn Forge>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Forge for DryRunForge {
    async fn pull_request(&self, number: u64) -> Result<PullRequestRecord, ForgeError> {
        self.inner.pull_request(number).await
    }

    async fn approved_reviewers(&self, number: u64) -> Result<Vec<String>, ForgeError> {
        self.inner.approved_reviewers(number).await
    }

    async fn open_milestones(&self) -> Result<Vec<MilestoneRecord>, ForgeError> {
        self.inner.open_milestones().await
    }

    async fn workflow_url(&self, workflow_file: &str) -> Result<Option<String>, ForgeError> {
        self.inner.workflow_url(workflow_file).await
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), ForgeError> {
        info!(pr = number, labels = ?labels, "[DRY RUN] Would add labels");
        Ok(())
    }

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), ForgeError> {
        info!(pr = number, label, "[DRY RUN] Would remove label");
        Ok(())
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<(), ForgeError> {
        info!(pr = number, "[DRY RUN] Would post comment");
        for line in body.lines() {
            info!("    {line}");
        }
        Ok(())
    }

    async fn create_pull_request(
        &self,
        request: &NewPullRequest,
    ) -> Result<OpenPullRequest, ForgeError> {
        info!(
            base = %request.base,
            head = %request.head,
            title = %request.title,
            "[DRY RUN] Would open pull request"
        );
        Ok(OpenPullRequest {
            number: 0,
            url: format!("dry-run://{}", request.head),
        })
    }

    async fn request_reviewers(
        &self,
        number: u64,
        reviewers: &[String],
    ) -> Result<(), ForgeError> {
        info!(pr = number, reviewers = ?reviewers, "[DRY RUN] Would request reviewers");
        Ok(())
    }

    async fn find_open_pull_request(
        &self,
        head_branch: &str,
    ) -> Result<Option<OpenPullRequest>, ForgeError> {
        self.inner.find_open_pull_request(head_branch).await
    }

    async fn authenticated_login(&self) -> Result<String, ForgeError> {
        self.inner.authenticated_login().await
    }
}
