//! Source pull request lookup.
//!
//! Fetches the pull request being backported once per run and snapshots the
//! fields every later step needs.

use crate::context::BackportContext;
use crate::forge::{ForgeError, LabelRecord};
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, info_span, warn, Instrument};

/// Immutable snapshot of the pull request being backported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePullRequest {
    pub number: u64,
    pub merge_commit_sha: String,
    pub title: String,
    pub body: String,
    /// First label starting with the configured category prefix.
    pub category_label: Option<String>,
    pub author_login: String,
    /// Reviewers who approved, in first-seen order.
    pub approver_logins: Vec<String>,
    /// Milestone the change landed in; the first backport target.
    pub milestone: String,
}

/// Reasons the source pull request can't be backported at all.
#[derive(Debug, Error)]
pub enum LocateError {
    /// The pull request has not been merged, so there is nothing to cherry-pick.
    #[error("Pull request #{number} has no merge commit yet")]
    NoMergeCommit { number: u64 },

    /// The pull request has no milestone to start backporting from.
    #[error("Pull request #{number} has no milestone")]
    NoMilestone { number: u64 },

    /// The hosting platform could not be queried.
    #[error(transparent)]
    Forge(#[from] ForgeError),
}

/// Fetches and snapshots the source pull request.
///
/// A missing category label is not an error; the snapshot simply carries none.
///
/// # Errors
///
/// Returns [`LocateError::NoMergeCommit`] or [`LocateError::NoMilestone`]
/// when the pull request can't be backported, and [`LocateError::Forge`] when
/// the API fails.
pub async fn locate(ctx: &BackportContext, number: u64) -> Result<SourcePullRequest, LocateError> {
    let span = info_span!("locate", pr = number);

    async {
        let record = ctx.forge().pull_request(number).await?;

        let merge_commit_sha = match (record.merged, record.merge_commit_sha) {
            (Some(false), _) | (_, None) => return Err(LocateError::NoMergeCommit { number }),
            (_, Some(sha)) if sha.trim().is_empty() => {
                return Err(LocateError::NoMergeCommit { number })
            }
            (_, Some(sha)) => sha,
        };

        let milestone = record
            .milestone
            .and_then(|m| m.title)
            .filter(|title| !title.trim().is_empty())
            .ok_or(LocateError::NoMilestone { number })?;

        let category_label =
            select_category_label(&record.labels, &ctx.config().category_label_prefix);
        if category_label.is_none() {
            warn!("Pull request has no category label");
        }

        let approver_logins = ctx.forge().approved_reviewers(number).await?;

        let source = SourcePullRequest {
            number,
            merge_commit_sha,
            title: record.title.unwrap_or_default(),
            body: record.body.unwrap_or_default(),
            category_label,
            author_login: record.user.map(|u| u.login).unwrap_or_default(),
            approver_logins,
            milestone,
        };

        info!(
            sha = %source.merge_commit_sha,
            milestone = %source.milestone,
            category = ?source.category_label,
            "Located source pull request"
        );
        Ok(source)
    }
    .instrument(span)
    .await
}

/// Returns the first label whose name starts with `prefix`.
#[must_use]
pub fn select_category_label(labels: &[LabelRecord], prefix: &str) -> Option<String> {
    labels
        .iter()
        .find(|label| label.name.starts_with(prefix))
        .map(|label| label.name.clone())
}

/// Asks on the terminal for a category label.
///
/// The answer is prefixed with `prefix` when the user leaves it off. An empty
/// answer (or a closed stdin) means no label.
///
/// # Errors
///
/// Returns an I/O error if the terminal can't be read or written.
pub async fn prompt_category_label(prefix: &str) -> std::io::Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(
            format!("This pull request has no `{prefix}*` label. Category (blank for none): ")
                .as_bytes(),
        )
        .await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;

    let answer = normalize_category_answer(&line, prefix);
    debug!(answer = ?answer, "Category prompt answered");
    Ok(answer)
}

fn normalize_category_answer(line: &str, prefix: &str) -> Option<String> {
    let answer = line.trim();
    if answer.is_empty() {
        None
    } else if answer.starts_with(prefix) {
        Some(answer.to_string())
    } else {
        Some(format!("{prefix}{answer}"))
    }
}
