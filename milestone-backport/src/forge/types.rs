//! Wire records exchanged with the hosting platform.

use serde::{Deserialize, Serialize};

/// A pull request as returned by `GET /repos/{owner}/{repo}/pulls/{number}`.
///
/// Only the fields the backport flow reads are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestRecord {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    #[serde(default)]
    pub milestone: Option<MilestoneRecord>,
    #[serde(default)]
    pub labels: Vec<LabelRecord>,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

/// A milestone; GitHub always sends a title but it is treated as optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MilestoneRecord {
    #[serde(default)]
    pub title: Option<String>,
}

impl MilestoneRecord {
    /// Creates a record with the given title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelRecord {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    pub login: String,
}

/// A pull request review.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRecord {
    /// Review state, e.g. `APPROVED`, `COMMENTED`, `CHANGES_REQUESTED`.
    pub state: String,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

/// A pull request to be opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    /// Branch the backport targets (the milestone branch).
    pub base: String,
    /// Branch carrying the cherry-picked commit.
    pub head: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub reviewers: Vec<String>,
}

/// An open pull request, identified by number and web URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPullRequest {
    pub number: u64,
    pub url: String,
}

/// Keeps the logins of approving reviewers, first-seen order, without duplicates.
#[must_use]
pub fn approved_logins(reviews: &[ReviewRecord]) -> Vec<String> {
    let mut logins: Vec<String> = Vec::new();
    for review in reviews {
        if !review.state.eq_ignore_ascii_case("approved") {
            continue;
        }
        if let Some(user) = &review.user {
            if !logins.contains(&user.login) {
                logins.push(user.login.clone());
            }
        }
    }
    logins
}
