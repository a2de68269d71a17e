//! Hosting platform access.
//!
//! The backport flow only talks to the hosting platform through the
//! [`Forge`] trait. [`GitHubForge`] is the production implementation backed
//! by octocrab; [`DryRunForge`] wraps any forge and turns writes into log
//! lines.

mod dry_run;
mod error;
mod github;
mod repo;
mod types;

pub use dry_run::DryRunForge;
pub use error::ForgeError;
pub use github::GitHubForge;
pub use repo::{RepoSlug, REPOSITORY_ENV};
pub use types::{
    approved_logins, LabelRecord, MilestoneRecord, NewPullRequest, OpenPullRequest,
    PullRequestRecord, ReviewRecord, UserRecord,
};

use async_trait::async_trait;

/// Reads and writes against one hosted repository.
///
/// Label mutations must be idempotent: adding a label that is already present
/// or removing one that is absent succeeds.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Fetches a pull request by number.
    async fn pull_request(&self, number: u64) -> Result<PullRequestRecord, ForgeError>;

    /// Lists the logins of reviewers who approved a pull request.
    async fn approved_reviewers(&self, number: u64) -> Result<Vec<String>, ForgeError>;

    /// Lists all open milestones, in the order the platform returns them.
    async fn open_milestones(&self) -> Result<Vec<MilestoneRecord>, ForgeError>;

    /// Returns the web URL of the workflow defined in `workflow_file`, if it exists.
    async fn workflow_url(&self, workflow_file: &str) -> Result<Option<String>, ForgeError>;

    /// Adds labels to an issue or pull request.
    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), ForgeError>;

    /// Removes a label from an issue or pull request.
    async fn remove_label(&self, number: u64, label: &str) -> Result<(), ForgeError>;

    /// Posts a comment on an issue or pull request.
    async fn create_comment(&self, number: u64, body: &str) -> Result<(), ForgeError>;

    /// Opens a pull request. Labels and reviewers are applied separately.
    async fn create_pull_request(
        &self,
        request: &NewPullRequest,
    ) -> Result<OpenPullRequest, ForgeError>;

    /// Requests reviews on a pull request.
    async fn request_reviewers(&self, number: u64, reviewers: &[String])
        -> Result<(), ForgeError>;

    /// Finds the open pull request whose head is `head_branch` in this repository.
    async fn find_open_pull_request(
        &self,
        head_branch: &str,
    ) -> Result<Option<OpenPullRequest>, ForgeError>;

    /// Returns the login the client is authenticated as.
    async fn authenticated_login(&self) -> Result<String, ForgeError>;
}
