//! Backport publishing.
//!
//! An applied cherry-pick is pushed and a pull request is opened against the
//! milestone branch. Attempts that need a human instead get a
//! [`RecoveryRecipe`].

mod recipe;

pub use recipe::RecoveryRecipe;

use crate::attempt::{AttemptOutcome, BackportAttempt};
use crate::context::BackportContext;
use crate::forge::{ForgeError, NewPullRequest};
use crate::locator::SourcePullRequest;
use crate::templates::generate_pr_title;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Looks for a backport pull request left open by an earlier run.
///
/// # Errors
///
/// Returns [`ForgeError`] if the lookup fails.
pub async fn existing_backport(
    ctx: &BackportContext,
    attempt: &BackportAttempt,
) -> Result<Option<AttemptOutcome>, ForgeError> {
    let existing = ctx
        .forge()
        .find_open_pull_request(&attempt.branch_name)
        .await?;

    Ok(existing.map(|pr| AttemptOutcome::Published {
        number: pr.number,
        url: pr.url,
        reused: true,
    }))
}

/// Reviewers for a backport: the approvers, then the original author if not
/// already among them.
#[must_use]
pub fn backport_reviewers(source: &SourcePullRequest) -> Vec<String> {
    let mut reviewers = source.approver_logins.clone();
    if !source.author_login.is_empty() && !reviewers.contains(&source.author_login) {
        reviewers.push(source.author_login.clone());
    }
    reviewers
}

/// Builds the pull request that carries a backport.
#[must_use]
pub fn backport_request(source: &SourcePullRequest, attempt: &BackportAttempt) -> NewPullRequest {
    NewPullRequest {
        base: attempt.milestone.clone(),
        head: attempt.branch_name.clone(),
        title: generate_pr_title(source),
        body: source.body.clone(),
        labels: source.category_label.iter().cloned().collect(),
        reviewers: backport_reviewers(source),
    }
}

/// Pushes the backport branch and opens its pull request.
///
/// Expects the branch to be checked out with the cherry-pick applied. An
/// already-open pull request for the branch is reused without pushing.
/// Failures become [`AttemptOutcome::PublishFailed`].
pub async fn publish(
    ctx: &BackportContext,
    source: &SourcePullRequest,
    attempt: &BackportAttempt,
) -> AttemptOutcome {
    let span = info_span!("publish", branch = %attempt.branch_name);

    async {
        match existing_backport(ctx, attempt).await {
            Ok(Some(outcome)) => {
                info!(url = ?outcome.url(), "Backport pull request already open");
                return outcome;
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "Failed to look up existing backport");
                return AttemptOutcome::PublishFailed {
                    reason: e.to_string(),
                };
            }
        }

        let remote = &ctx.config().remote;
        debug!(remote = %remote, "Pushing branch");
        if let Err(e) = ctx.vcs().push(remote, &attempt.branch_name).await {
            error!(error = %e, "Failed to push backport branch");
            return AttemptOutcome::PublishFailed {
                reason: e.to_string(),
            };
        }

        let request = backport_request(source, attempt);
        let pr = match ctx.forge().create_pull_request(&request).await {
            Ok(pr) => pr,
            Err(e) => {
                error!(error = %e, "Failed to open backport pull request");
                return AttemptOutcome::PublishFailed {
                    reason: e.to_string(),
                };
            }
        };
        info!(pr_number = pr.number, url = %pr.url, "Backport pull request opened");

        // The pull request is open from here on; the attempt is published.
        decorate(ctx, pr.number, &request).await;

        AttemptOutcome::Published {
            number: pr.number,
            url: pr.url,
            reused: false,
        }
    }
    .instrument(span)
    .await
}

/// Applies the category label and requests reviewers on an opened backport.
async fn decorate(ctx: &BackportContext, number: u64, request: &NewPullRequest) {
    if !request.labels.is_empty() {
        if let Err(e) = ctx.forge().add_labels(number, &request.labels).await {
            warn!(
                pr = number,
                labels = ?request.labels,
                error = %e,
                "Failed to label backport pull request"
            );
        }
    }

    if !request.reviewers.is_empty() {
        if let Err(e) = ctx.forge().request_reviewers(number, &request.reviewers).await {
            warn!(
                pr = number,
                reviewers = ?request.reviewers,
                error = %e,
                "Failed to request reviewers"
            );
        }
    }
}

/// Recovery instructions for a failed attempt.
///
/// Returns `None` for attempts that don't need a human.
#[must_use]
pub fn recovery_recipe(
    ctx: &BackportContext,
    source: &SourcePullRequest,
    attempt: &BackportAttempt,
) -> Option<RecoveryRecipe> {
    match attempt.outcome {
        AttemptOutcome::Conflicted | AttemptOutcome::BranchFetchFailed { .. } => {
            Some(RecoveryRecipe::cherry_pick(ctx, source, attempt))
        }
        AttemptOutcome::PublishFailed { .. } => {
            Some(RecoveryRecipe::publish_retry(ctx, source, attempt))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourcePullRequest {
        SourcePullRequest {
            number: 19214,
            merge_commit_sha: "abc123".to_string(),
            title: "Fix lockfile invalidation".to_string(),
            body: "Fixes #19000.".to_string(),
            category_label: Some("category:bugfix".to_string()),
            author_login: "author".to_string(),
            approver_logins: vec!["reviewer".to_string()],
            milestone: "2.16.x".to_string(),
        }
    }

    #[test]
    fn appends_author_to_reviewers() {
        assert_eq!(backport_reviewers(&source()), vec!["reviewer", "author"]);
    }

    #[test]
    fn does_not_duplicate_author() {
        let mut source = source();
        source.approver_logins = vec!["author".to_string()];
        assert_eq!(backport_reviewers(&source), vec!["author"]);
    }

    #[test]
    fn builds_backport_request() {
        let attempt = BackportAttempt::new(19214, "2.17.x");
        let request = backport_request(&source(), &attempt);

        assert_eq!(request.base, "2.17.x");
        assert_eq!(request.head, "cherry-pick-19214-to-2.17.x");
        assert_eq!(request.title, "Fix lockfile invalidation (Cherry-pick of #19214)");
        assert_eq!(request.body, "Fixes #19000.");
        assert_eq!(request.labels, vec!["category:bugfix"]);
        assert_eq!(request.reviewers, vec!["reviewer", "author"]);
    }

    #[test]
    fn request_without_category_has_no_labels() {
        let mut source = source();
        source.category_label = None;
        let request = backport_request(&source, &BackportAttempt::new(19214, "2.17.x"));

        assert!(request.labels.is_empty());
    }
}
