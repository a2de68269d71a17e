//! Feedback on the source pull request.
//!
//! Turns the outcome of a run into label changes and comments on the pull
//! request that was backported. Every label mutation here is idempotent, so
//! re-running a run (or a single matrix unit) never fails on labels.

mod error;

pub use error::ReportError;

use crate::attempt::BackportAttempt;
use crate::context::BackportContext;
use crate::locator::{LocateError, SourcePullRequest};
use crate::publish::recovery_recipe;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, info_span, warn, Instrument};

/// Concurrent head-branch lookups while re-discovering backports.
const REDISCOVERY_CONCURRENCY: usize = 4;

/// Reports the attempts of a finished fan-out.
///
/// When every attempt is published the `needs-cherrypick` label is removed
/// and one summary comment is posted. Otherwise the failure label is added
/// once and each failing attempt gets its own recovery comment.
///
/// # Errors
///
/// Returns [`ReportError`] if a label or comment can't be written.
pub async fn report_attempts(
    ctx: &BackportContext,
    source: &SourcePullRequest,
    attempts: &[BackportAttempt],
) -> Result<(), ReportError> {
    let span = info_span!("report", pr = source.number);

    async {
        let failing: Vec<&BackportAttempt> =
            attempts.iter().filter(|a| a.outcome.is_failure()).collect();

        if failing.is_empty() {
            let milestones: Vec<String> = attempts.iter().map(|a| a.milestone.clone()).collect();
            let found = rediscover(ctx, source.number, &milestones).await?;

            // Fall back to the URL recorded by this run when the lookup misses.
            let backports: Vec<(String, String)> = found
                .into_iter()
                .zip(attempts)
                .map(|((milestone, url), attempt)| {
                    let url = url
                        .or_else(|| attempt.outcome.url().map(str::to_string))
                        .unwrap_or_default();
                    (milestone, url)
                })
                .collect();

            return report_success(ctx, source.number, &backports).await;
        }

        add_failure_label(ctx, source.number).await?;
        for attempt in &failing {
            comment_recipe(ctx, source, attempt).await?;
        }

        info!(failed = failing.len(), "Reported failed backports");
        Ok(())
    }
    .instrument(span)
    .await
}

/// Reports a single failed attempt from a matrix unit.
///
/// Adds the failure label and posts the attempt's recovery comment. Attempts
/// that did not fail are ignored.
///
/// # Errors
///
/// Returns [`ReportError`] if a label or comment can't be written.
pub async fn report_attempt_failure(
    ctx: &BackportContext,
    source: &SourcePullRequest,
    attempt: &BackportAttempt,
) -> Result<(), ReportError> {
    if !attempt.outcome.is_failure() {
        return Ok(());
    }

    add_failure_label(ctx, source.number).await?;
    comment_recipe(ctx, source, attempt).await
}

/// Reports why the source pull request couldn't be located.
///
/// The comment links to the workflow so a human can fix the pull request and
/// re-run it. API failures are not reported on the pull request.
///
/// # Errors
///
/// Returns [`ReportError`] if a label or comment can't be written.
pub async fn report_locate_failure(
    ctx: &BackportContext,
    error: &LocateError,
) -> Result<(), ReportError> {
    let (number, body) = match error {
        LocateError::NoMergeCommit { number } => {
            let url = workflow_link(ctx).await;
            (*number, ctx.renderer().render_no_merge_commit_comment(&url)?)
        }
        LocateError::NoMilestone { number } => {
            let url = workflow_link(ctx).await;
            (*number, ctx.renderer().render_no_milestone_comment(&url)?)
        }
        LocateError::Forge(_) => return Ok(()),
    };

    add_failure_label(ctx, number).await?;
    ctx.forge().create_comment(number, &body).await?;
    info!(pr = number, error = %error, "Reported locate failure");
    Ok(())
}

/// Reports that the source milestone is not among the open milestones.
///
/// # Errors
///
/// Returns [`ReportError`] if a label or comment can't be written.
pub async fn report_no_milestones(
    ctx: &BackportContext,
    source: &SourcePullRequest,
) -> Result<(), ReportError> {
    let url = workflow_link(ctx).await;
    let body = ctx
        .renderer()
        .render_no_open_milestones_comment(&source.milestone, &url)?;

    add_failure_label(ctx, source.number).await?;
    ctx.forge().create_comment(source.number, &body).await?;
    info!(pr = source.number, milestone = %source.milestone, "Reported missing open milestone");
    Ok(())
}

/// Finalizes a fanned-out run from the backport pull requests that exist.
///
/// Each milestone's backport is looked up by its deterministic head branch.
/// If all are open, success is reported; otherwise only the failure label is
/// added, since failing units post their own recovery comments.
///
/// Returns whether every backport was found.
///
/// # Errors
///
/// Returns [`ReportError`] if a lookup, label or comment fails.
pub async fn report_rediscovered(
    ctx: &BackportContext,
    pr_number: u64,
    milestones: &[String],
) -> Result<bool, ReportError> {
    let span = info_span!("report_rediscovered", pr = pr_number);

    async {
        let found = rediscover(ctx, pr_number, milestones).await?;

        let missing: Vec<&str> = found
            .iter()
            .filter(|(_, url)| url.is_none())
            .map(|(milestone, _)| milestone.as_str())
            .collect();

        if !missing.is_empty() {
            warn!(missing = ?missing, "Backport pull requests missing");
            add_failure_label(ctx, pr_number).await?;
            return Ok(false);
        }

        let backports: Vec<(String, String)> = found
            .into_iter()
            .map(|(milestone, url)| (milestone, url.unwrap_or_default()))
            .collect();
        report_success(ctx, pr_number, &backports).await?;
        Ok(true)
    }
    .instrument(span)
    .await
}

/// Looks up the open backport pull request of each milestone, in order.
async fn rediscover(
    ctx: &BackportContext,
    pr_number: u64,
    milestones: &[String],
) -> Result<Vec<(String, Option<String>)>, ReportError> {
    let lookups: Vec<_> = stream::iter(milestones)
        .map(|milestone| async move {
            let branch = crate::attempt::branch_name(pr_number, milestone);
            let found = ctx.forge().find_open_pull_request(&branch).await?;
            debug!(branch = %branch, found = found.is_some(), "Looked up backport");
            Ok::<_, ReportError>((milestone.clone(), found.map(|pr| pr.url)))
        })
        .buffered(REDISCOVERY_CONCURRENCY)
        .collect()
        .await;

    lookups.into_iter().collect()
}

async fn report_success(
    ctx: &BackportContext,
    pr_number: u64,
    backports: &[(String, String)],
) -> Result<(), ReportError> {
    ctx.forge()
        .remove_label(pr_number, &ctx.config().needs_cherrypick_label)
        .await?;

    let body = ctx.renderer().render_success_comment(backports)?;
    ctx.forge().create_comment(pr_number, &body).await?;

    info!(count = backports.len(), "Reported published backports");
    Ok(())
}

async fn add_failure_label(ctx: &BackportContext, pr_number: u64) -> Result<(), ReportError> {
    let label = ctx.config().failure_label.clone();
    ctx.forge().add_labels(pr_number, &[label]).await?;
    Ok(())
}

async fn comment_recipe(
    ctx: &BackportContext,
    source: &SourcePullRequest,
    attempt: &BackportAttempt,
) -> Result<(), ReportError> {
    let Some(recipe) = recovery_recipe(ctx, source, attempt) else {
        return Ok(());
    };

    let body = ctx.renderer().render_recovery_comment(attempt, &recipe)?;
    ctx.forge().create_comment(source.number, &body).await?;
    debug!(
        milestone = %attempt.milestone,
        outcome = attempt.outcome.as_str(),
        "Posted recovery comment"
    );
    Ok(())
}

/// Web link to the workflow, built from the repository URL if the lookup fails.
async fn workflow_link(ctx: &BackportContext) -> String {
    let file = &ctx.config().workflow_file;
    match ctx.forge().workflow_url(file).await {
        Ok(Some(url)) => url,
        Ok(None) => ctx.repo().workflow_url(file),
        Err(e) => {
            warn!(error = %e, "Failed to look up workflow, linking by file name");
            ctx.repo().workflow_url(file)
        }
    }
}
