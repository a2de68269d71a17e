//! GitHub implementation of [`Forge`] backed by octocrab.

use super::types::{
    approved_logins, MilestoneRecord, NewPullRequest, OpenPullRequest, PullRequestRecord,
    ReviewRecord,
};
use super::{Forge, ForgeError, RepoSlug};
use crate::rate_limit::ensure_core_rate_limit;
use async_trait::async_trait;
use octocrab::params::State;
use octocrab::{Octocrab, Page};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Results per page for list endpoints.
const PER_PAGE: u8 = 100;

/// Entry of `GET /repos/{owner}/{repo}/actions/workflows`.
#[derive(Debug, Deserialize)]
struct WorkflowRecord {
    path: String,
}

/// Directory GitHub Actions reads workflow definitions from.
const WORKFLOWS_DIR: &str = ".github/workflows/";

/// Finds the file name of the workflow defined as `workflow_file`.
///
/// `.yml` and `.yaml` name the same workflow; an exact path wins over the
/// other extension.
fn find_workflow_file(workflows: &[WorkflowRecord], workflow_file: &str) -> Option<String> {
    let stem = workflow_file
        .strip_suffix(".yaml")
        .or_else(|| workflow_file.strip_suffix(".yml"))
        .unwrap_or(workflow_file);
    let candidates = [
        workflow_file.to_string(),
        format!("{stem}.yml"),
        format!("{stem}.yaml"),
    ];

    candidates.into_iter().find(|candidate| {
        workflows
            .iter()
            .any(|workflow| workflow.path.strip_prefix(WORKFLOWS_DIR) == Some(candidate.as_str()))
    })
}

/// [`Forge`] talking to the GitHub REST API.
#[derive(Clone)]
pub struct GitHubForge {
    octocrab: Octocrab,
    repo: RepoSlug,
}

impl GitHubForge {
    /// Builds a client authenticated with a personal access or Actions token.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError`] if the HTTP client can't be constructed.
    pub fn new(token: &str, repo: RepoSlug) -> Result<Self, ForgeError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()?;
        Ok(Self::with_client(octocrab, repo))
    }

    /// Wraps an already configured client.
    pub fn with_client(octocrab: Octocrab, repo: RepoSlug) -> Self {
        Self { octocrab, repo }
    }

    /// Reads every page of a list endpoint.
    async fn list_all<T: DeserializeOwned>(
        &self,
        suffix: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, ForgeError> {
        let per_page = PER_PAGE.to_string();
        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("per_page", &per_page));

        let first: Page<T> = self.octocrab.get(self.route(suffix), Some(&query)).await?;
        Ok(self.octocrab.all_pages(first).await?)
    }

    /// Builds a REST route under this repository.
    fn route(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{}", self.repo.owner, self.repo.name, suffix)
    }

    fn pull_request_url(&self, number: u64, html_url: Option<&url::Url>) -> String {
        html_url
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("{}/pull/{}", self.repo.html_url(), number))
    }
}

#[async_trait]
impl Forge for GitHubForge {
    async fn pull_request(&self, number: u64) -> Result<PullRequestRecord, ForgeError> {
        debug!(pr = number, "Fetching pull request");
        let record = self
            .octocrab
            .get(self.route(&format!("/pulls/{number}")), None::<&()>)
            .await?;
        Ok(record)
    }

    async fn approved_reviewers(&self, number: u64) -> Result<Vec<String>, ForgeError> {
        debug!(pr = number, "Listing reviews");
        let reviews: Vec<ReviewRecord> = self
            .list_all(&format!("/pulls/{number}/reviews"), &[])
            .await?;
        Ok(approved_logins(&reviews))
    }

    async fn open_milestones(&self) -> Result<Vec<MilestoneRecord>, ForgeError> {
        debug!(repo = %self.repo, "Listing open milestones");
        self.list_all("/milestones", &[("state", "open")]).await
    }

    async fn workflow_url(&self, workflow_file: &str) -> Result<Option<String>, ForgeError> {
        let workflows: Vec<WorkflowRecord> = self.list_all("/actions/workflows", &[]).await?;

        let found = find_workflow_file(&workflows, workflow_file);
        if found.is_none() {
            debug!(workflow_file, "Workflow not defined in repository");
        }
        Ok(found.map(|file| self.repo.workflow_url(&file)))
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), ForgeError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        // GitHub ignores labels that are already present.
        self.octocrab
            .issues(&self.repo.owner, &self.repo.name)
            .add_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), ForgeError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        match self
            .octocrab
            .issues(&self.repo.owner, &self.repo.name)
            .remove_label(number, label)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => {
                debug!(pr = number, label, "Label already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<(), ForgeError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        self.octocrab
            .issues(&self.repo.owner, &self.repo.name)
            .create_comment(number, body)
            .await?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        request: &NewPullRequest,
    ) -> Result<OpenPullRequest, ForgeError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let pr = self
            .octocrab
            .pulls(&self.repo.owner, &self.repo.name)
            .create(&request.title, &request.head, &request.base)
            .body(&request.body)
            .send()
            .await?;

        Ok(OpenPullRequest {
            number: pr.number,
            url: self.pull_request_url(pr.number, pr.html_url.as_ref()),
        })
    }

    async fn request_reviewers(
        &self,
        number: u64,
        reviewers: &[String],
    ) -> Result<(), ForgeError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let route = self.route(&format!("/pulls/{number}/requested_reviewers"));
        let body = json!({ "reviewers": reviewers });
        let _: serde_json::Value = self.octocrab.post(route, Some(&body)).await?;
        Ok(())
    }

    async fn find_open_pull_request(
        &self,
        head_branch: &str,
    ) -> Result<Option<OpenPullRequest>, ForgeError> {
        let page = self
            .octocrab
            .pulls(&self.repo.owner, &self.repo.name)
            .list()
            .state(State::Open)
            .head(format!("{}:{}", self.repo.owner, head_branch))
            .per_page(PER_PAGE)
            .send()
            .await?;

        Ok(page.items.first().map(|pr| OpenPullRequest {
            number: pr.number,
            url: self.pull_request_url(pr.number, pr.html_url.as_ref()),
        }))
    }

    async fn authenticated_login(&self) -> Result<String, ForgeError> {
        let user = self.octocrab.current().user().await?;
        Ok(user.login)
    }
}

/// Checks if an error is a 404 from the API.
fn is_not_found(error: &octocrab::Error) -> bool {
    match error {
        octocrab::Error::GitHub { source, .. } => source.status_code.as_u16() == 404,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::combinators::BoxBody;
    use http_body_util::{BodyExt, Full};
    use octocrab::FromResponse;

    fn json_body(json: &'static str) -> BoxBody<Bytes, octocrab::Error> {
        Full::new(Bytes::from_static(json.as_bytes()))
            .map_err(|never| match never {})
            .boxed()
    }

    /// Runs a canned API response through octocrab's own error mapping.
    async fn api_error(status: u16) -> octocrab::Error {
        let response = http::Response::builder()
            .status(status)
            .body(json_body(
                r#"{"message":"Label does not exist","documentation_url":"https://docs.github.com/rest"}"#,
            ))
            .unwrap();

        octocrab::map_github_error(response).await.unwrap_err()
    }

    fn workflows(paths: &[&str]) -> Vec<WorkflowRecord> {
        paths
            .iter()
            .map(|path| WorkflowRecord {
                path: path.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn missing_label_response_counts_as_removed() {
        assert!(is_not_found(&api_error(404).await));
    }

    #[tokio::test]
    async fn other_api_errors_are_not_absorbed() {
        assert!(!is_not_found(&api_error(403).await));
        assert!(!is_not_found(&api_error(422).await));
    }

    #[test]
    fn finds_workflow_by_exact_path() {
        let list = workflows(&[
            ".github/workflows/foo-auto-cherry-picker.yaml",
            ".github/workflows/auto-cherry-picker.yaml",
        ]);

        assert_eq!(
            find_workflow_file(&list, "auto-cherry-picker.yaml").as_deref(),
            Some("auto-cherry-picker.yaml")
        );
    }

    #[test]
    fn ignores_workflows_sharing_a_suffix() {
        let list = workflows(&[
            ".github/workflows/foo-auto-cherry-picker.yaml",
            "nested/.github/workflows/auto-cherry-picker.yaml",
        ]);

        assert_eq!(find_workflow_file(&list, "auto-cherry-picker.yaml"), None);
    }

    #[test]
    fn follows_the_other_yaml_extension() {
        let list = workflows(&[".github/workflows/auto-cherry-picker.yml"]);

        assert_eq!(
            find_workflow_file(&list, "auto-cherry-picker.yaml").as_deref(),
            Some("auto-cherry-picker.yml")
        );
    }

    #[tokio::test]
    async fn milestone_page_keeps_link_to_the_next_page() {
        let response = http::Response::builder()
            .status(200)
            .header(
                "Link",
                r#"<https://api.github.com/repositories/1/milestones?state=open&per_page=100&page=2>; rel="next""#,
            )
            .body(json_body(r#"[{"title":"2.16.x"},{"title":"2.17.x"}]"#))
            .unwrap();

        let page = Page::<MilestoneRecord>::from_response(response)
            .await
            .unwrap();

        assert_eq!(
            page.items,
            vec![MilestoneRecord::titled("2.16.x"), MilestoneRecord::titled("2.17.x")]
        );
        assert!(page.next.is_some());
    }

    #[tokio::test]
    async fn workflow_page_reads_the_workflows_envelope() {
        let response = http::Response::builder()
            .status(200)
            .body(json_body(
                r#"{"total_count":1,"workflows":[{"id":161335,"name":"Auto Cherry-Picker","path":".github/workflows/auto-cherry-picker.yaml","state":"active"}]}"#,
            ))
            .unwrap();

        let page = Page::<WorkflowRecord>::from_response(response)
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].path, ".github/workflows/auto-cherry-picker.yaml");
        assert!(page.next.is_none());
    }
}
