//! Orchestrates backport runs.
//!
//! A full run locates the source pull request, resolves the milestones to
//! backport to, attempts each one in ascending order on the same checkout and
//! reports the outcome back on the source pull request. The job-matrix modes
//! ([`Runner::plan`], [`Runner::pick`], [`Runner::report`]) split the same
//! flow across independent CI jobs.

mod config;
mod error;
mod state;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::attempt::{AttemptOutcome, BackportAttempt};
use crate::cherry_pick;
use crate::config::resolve_config;
use crate::context::BackportContext;
use crate::feedback::{
    report_attempt_failure, report_attempts, report_locate_failure, report_no_milestones,
    report_rediscovered,
};
use crate::forge::GitHubForge;
use crate::locator::{locate, prompt_category_label, LocateError, SourcePullRequest};
use crate::materialize::materialize;
use crate::milestones::resolve_milestones;
use crate::publish::{existing_backport, publish};
use crate::summary::{RunOutcome, RunPlan, RunSummary};
use crate::vcs::GitCli;
use state::RunState;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Result of looking up the source pull request.
enum Located {
    Source(SourcePullRequest),
    Halted(RunOutcome),
}

/// Runs backports against one repository and checkout.
pub struct Runner {
    ctx: BackportContext,
    interactive: bool,
}

impl Runner {
    /// Builds a runner backed by GitHub and the `git` CLI.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the settings can't be loaded or the GitHub
    /// client can't be built.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let settings = resolve_config(config.config_path(), config.workdir())?;
        let forge = GitHubForge::new(config.token(), config.repo().clone())?;
        let vcs = GitCli::new(config.workdir());

        let mut ctx = BackportContext::new(
            config.repo().clone(),
            settings,
            Arc::new(forge),
            Arc::new(vcs),
        );
        if config.dry_run() {
            ctx = ctx.into_dry_run();
        }

        Ok(Self {
            ctx,
            interactive: config.interactive(),
        })
    }

    /// Builds a non-interactive runner around an existing context.
    pub fn from_context(ctx: BackportContext) -> Self {
        Self {
            ctx,
            interactive: false,
        }
    }

    /// Returns the shared context.
    pub fn context(&self) -> &BackportContext {
        &self.ctx
    }

    /// Checks that the checkout is clean and the token authenticates.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Precondition`] when either check fails.
    pub async fn check_preconditions(&self) -> Result<(), RunnerError> {
        self.check_clean_tree().await?;
        self.check_authenticated().await
    }

    /// Backports pull request `pr_number` to every relevant milestone.
    ///
    /// With `milestone`, only that milestone is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on precondition failures and on API failures
    /// outside a single attempt. Failed attempts are reported, not returned.
    pub async fn run(
        &self,
        pr_number: u64,
        milestone: Option<&str>,
    ) -> Result<RunSummary, RunnerError> {
        let span = info_span!("run", pr = pr_number);

        async {
            self.check_preconditions().await?;

            let source = match self.locate_source(pr_number, true).await? {
                Located::Source(source) => source,
                Located::Halted(outcome) => {
                    return Ok(RunSummary::halted(pr_number, outcome, self.ctx.dry_run()))
                }
            };

            let milestones = match milestone {
                Some(milestone) => {
                    info!(milestone = %milestone, "Using explicit milestone");
                    vec![milestone.to_string()]
                }
                None => self.resolve(&source).await?,
            };
            if milestones.is_empty() {
                return Ok(RunSummary::halted(
                    pr_number,
                    RunOutcome::FailedNoMilestones,
                    self.ctx.dry_run(),
                ));
            }

            transition(RunState::FanningOut);
            let mut attempts = Vec::with_capacity(milestones.len());
            for (index, milestone) in milestones.iter().enumerate() {
                let more_follow = index + 1 < milestones.len();
                attempts.push(self.run_attempt(&source, milestone, more_follow).await);
            }

            transition(RunState::Reporting);
            report_attempts(&self.ctx, &source, &attempts).await?;

            transition(RunState::Done);
            Ok(RunSummary::done(pr_number, attempts, self.ctx.dry_run()))
        }
        .instrument(span)
        .await
    }

    /// Resolves the milestones for a job matrix without attempting any.
    ///
    /// Locate and resolution failures are reported on the pull request.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the token doesn't authenticate or the API
    /// fails.
    pub async fn plan(&self, pr_number: u64) -> Result<RunPlan, RunnerError> {
        let span = info_span!("plan", pr = pr_number);

        async {
            self.check_authenticated().await?;

            let source = match self.locate_source(pr_number, true).await? {
                Located::Source(source) => source,
                Located::Halted(outcome) => {
                    return Ok(RunPlan {
                        pr_number,
                        outcome,
                        milestones: Vec::new(),
                    })
                }
            };

            let milestones = self.resolve(&source).await?;
            let outcome = if milestones.is_empty() {
                RunOutcome::FailedNoMilestones
            } else {
                RunOutcome::Done
            };

            Ok(RunPlan {
                pr_number,
                outcome,
                milestones,
            })
        }
        .instrument(span)
        .await
    }

    /// Runs one matrix unit: backports `pr_number` to `milestone` only.
    ///
    /// A failed attempt is reported on the pull request right away; success
    /// is left to [`Runner::report`]. Locate failures are not reported again.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on precondition failures and API failures.
    pub async fn pick(&self, pr_number: u64, milestone: &str) -> Result<RunSummary, RunnerError> {
        let span = info_span!("pick", pr = pr_number, milestone = %milestone);

        async {
            self.check_preconditions().await?;

            let source = match self.locate_source(pr_number, false).await? {
                Located::Source(source) => source,
                Located::Halted(outcome) => {
                    return Ok(RunSummary::halted(pr_number, outcome, self.ctx.dry_run()))
                }
            };

            let attempt = self.run_attempt(&source, milestone, false).await;
            report_attempt_failure(&self.ctx, &source, &attempt).await?;

            Ok(RunSummary::done(pr_number, vec![attempt], self.ctx.dry_run()))
        }
        .instrument(span)
        .await
    }

    /// Finalizes a matrix run from the backport pull requests that exist.
    ///
    /// Returns whether every milestone has an open backport.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if no milestones are given, the token doesn't
    /// authenticate or feedback can't be posted.
    pub async fn report(&self, pr_number: u64, milestones: &[String]) -> Result<bool, RunnerError> {
        if milestones.is_empty() {
            return Err(RunnerError::Precondition {
                message: "no milestones to report on".to_string(),
            });
        }
        self.check_authenticated().await?;

        transition(RunState::Reporting);
        let complete = report_rediscovered(&self.ctx, pr_number, milestones).await?;
        transition(RunState::Done);
        Ok(complete)
    }

    /// Publishes a backport branch prepared by hand after a conflict.
    ///
    /// Expects `cherry-pick-{pr}-to-{milestone}` to exist locally with the
    /// resolved cherry-pick committed.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on precondition failures and API failures.
    pub async fn publish(
        &self,
        pr_number: u64,
        milestone: &str,
    ) -> Result<RunSummary, RunnerError> {
        let span = info_span!("publish_manual", pr = pr_number, milestone = %milestone);

        async {
            self.check_preconditions().await?;

            let source = match self.locate_source(pr_number, false).await? {
                Located::Source(source) => source,
                Located::Halted(outcome) => {
                    return Ok(RunSummary::halted(pr_number, outcome, self.ctx.dry_run()))
                }
            };

            let mut attempt = BackportAttempt::new(pr_number, milestone);
            attempt.outcome = publish(&self.ctx, &source, &attempt).await;
            report_attempt_failure(&self.ctx, &source, &attempt).await?;

            Ok(RunSummary::done(pr_number, vec![attempt], self.ctx.dry_run()))
        }
        .instrument(span)
        .await
    }

    async fn check_clean_tree(&self) -> Result<(), RunnerError> {
        match self.ctx.vcs().is_clean().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(RunnerError::Precondition {
                message: "working tree has uncommitted changes".to_string(),
            }),
            Err(e) => Err(RunnerError::Precondition {
                message: format!("could not inspect working tree: {e}"),
            }),
        }
    }

    async fn check_authenticated(&self) -> Result<(), RunnerError> {
        match self.ctx.forge().authenticated_login().await {
            Ok(login) => {
                debug!(login = %login, "Authenticated");
                Ok(())
            }
            Err(e) => Err(RunnerError::Precondition {
                message: format!("GitHub token is not usable: {e}"),
            }),
        }
    }

    /// Locates the source pull request, optionally reporting why it can't be
    /// backported.
    async fn locate_source(&self, pr_number: u64, report: bool) -> Result<Located, RunnerError> {
        transition(RunState::LocatingCommit);

        let mut source = match locate(&self.ctx, pr_number).await {
            Ok(source) => source,
            Err(LocateError::Forge(e)) => return Err(e.into()),
            Err(e) => {
                let (state, outcome) = match e {
                    LocateError::NoMergeCommit { .. } => {
                        (RunState::FailedNoCommit, RunOutcome::FailedNoCommit)
                    }
                    _ => (RunState::FailedNoMilestone, RunOutcome::FailedNoMilestone),
                };
                warn!(error = %e, "Cannot backport pull request");
                if report {
                    report_locate_failure(&self.ctx, &e).await?;
                }
                transition(state);
                return Ok(Located::Halted(outcome));
            }
        };

        if source.category_label.is_none() && self.interactive && std::io::stdin().is_terminal()
        {
            match prompt_category_label(&self.ctx.config().category_label_prefix).await {
                Ok(label) => source.category_label = label,
                Err(e) => warn!(error = %e, "Failed to prompt for category label"),
            }
        }

        Ok(Located::Source(source))
    }

    /// Resolves the milestones for `source`, reporting when there are none.
    async fn resolve(&self, source: &SourcePullRequest) -> Result<Vec<String>, RunnerError> {
        transition(RunState::ResolvingMilestones);

        let milestones = resolve_milestones(&self.ctx, &source.milestone).await?;
        if milestones.is_empty() {
            report_no_milestones(&self.ctx, source).await?;
            transition(RunState::FailedNoMilestones);
        }
        Ok(milestones)
    }

    /// Runs one milestone through materialize, cherry-pick and publish.
    ///
    /// A conflicted checkout is aborted when `more_follow`, so the next
    /// attempt starts clean; the last one is left for a human.
    async fn run_attempt(
        &self,
        source: &SourcePullRequest,
        milestone: &str,
        more_follow: bool,
    ) -> BackportAttempt {
        let ctx = &self.ctx;
        let mut attempt = BackportAttempt::new(source.number, milestone);
        let span = info_span!("attempt", milestone = %milestone, branch = %attempt.branch_name);

        async move {
            match existing_backport(ctx, &attempt).await {
                Ok(Some(outcome)) => {
                    info!(url = ?outcome.url(), "Backport already open, skipping");
                    attempt.outcome = outcome;
                    return attempt;
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Failed to look up existing backport"),
            }

            debug!(state = "MATERIALIZING", "Attempt state");
            if let Err(e) = materialize(ctx, source, milestone, &attempt.branch_name).await {
                error!(error = %e, "Failed to materialize backport branch");
                attempt.outcome = AttemptOutcome::BranchFetchFailed {
                    reason: e.to_string(),
                };
                return attempt;
            }

            debug!(state = "CHERRY_PICKING", "Attempt state");
            attempt.outcome = match cherry_pick::apply(ctx, source).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "Failed to run cherry-pick");
                    AttemptOutcome::BranchFetchFailed {
                        reason: e.to_string(),
                    }
                }
            };

            match attempt.outcome {
                AttemptOutcome::Applied => {
                    debug!(state = "PUBLISHING", "Attempt state");
                    attempt.outcome = publish(ctx, source, &attempt).await;
                }
                AttemptOutcome::Conflicted if more_follow => {
                    cherry_pick::release_checkout(ctx).await;
                }
                _ => {}
            }

            info!(outcome = attempt.outcome.as_str(), "Attempt finished");
            attempt
        }
        .instrument(span)
        .await
    }
}

fn transition(state: RunState) {
    info!(state = %state, "Run state");
}
