//! CLI for milestone backports.
//!
//! Cherry-picks a landed pull request onto every open release milestone
//! branch, either in one process (`run`) or split across a CI job matrix
//! (`plan`, `pick`, `report`).

use clap::{Parser, Subcommand};
use milestone_backport::{RepoSlug, RunPlan, RunSummary, Runner, RunnerConfig, RunnerError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Milestone Backport - Cherry-pick a merged pull request onto open release branches.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Repository as `owner/name`. Defaults to `GITHUB_REPOSITORY`.
    #[arg(long, global = true)]
    repo: Option<RepoSlug>,

    /// GitHub token with push and pull request access.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Backport settings file. Defaults to `.github/backport.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Checkout the backports are prepared in.
    #[arg(long, default_value = ".", global = true)]
    workdir: PathBuf,

    /// Log checkout changes, pushes, labels, comments and pull requests instead of making them.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Prompt for a category label when the pull request has none.
    #[arg(long, global = true)]
    interactive: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Backport to every relevant milestone, or only to the one given.
    Run {
        /// Pull request number.
        pr: u64,
        /// Only backport to this milestone.
        milestone: Option<String>,
    },

    /// Print the milestones to backport to as JSON.
    Plan {
        /// Pull request number.
        pr: u64,
    },

    /// Backport to a single milestone.
    Pick {
        /// Pull request number.
        pr: u64,
        /// Target milestone.
        milestone: String,
    },

    /// Report success once every milestone has a backport pull request.
    Report {
        /// Pull request number.
        pr: u64,
        /// Milestones that were backported to.
        #[arg(required = true)]
        milestones: Vec<String>,
    },

    /// Push a hand-resolved backport branch and open its pull request.
    Publish {
        /// Pull request number.
        pr: u64,
        /// Target milestone.
        milestone: String,
    },
}

/// What a command produced, for printing and the exit code.
enum Output {
    Summary(RunSummary),
    Plan(RunPlan),
    Report { complete: bool },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(Output::Summary(summary)) => {
            print_summary(&summary);

            if summary.all_success() {
                ExitCode::from(0)
            } else {
                ExitCode::from(1)
            }
        }
        Ok(Output::Plan(plan)) => match serde_json::to_string(&plan.milestones) {
            Ok(json) => {
                println!("{json}");
                if plan.is_actionable() {
                    ExitCode::from(0)
                } else {
                    ExitCode::from(1)
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize plan");
                ExitCode::from(2)
            }
        },
        Ok(Output::Report { complete }) => {
            if complete {
                ExitCode::from(0)
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Logs go to stderr so `plan` output on stdout stays machine-readable.
/// The level is taken from `RUST_LOG`, defaulting to "info".
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<Output, RunnerError> {
    let repo = match args.repo {
        Some(repo) => repo,
        None => RepoSlug::from_env()?,
    };
    let token = args
        .token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| RunnerError::Precondition {
            message: "no GitHub token given; set GITHUB_TOKEN".to_string(),
        })?;

    let config = RunnerConfig::new(token, repo, args.workdir)
        .with_config_path(args.config)
        .with_dry_run(args.dry_run)
        .with_interactive(args.interactive);
    let runner = Runner::new(config)?;

    match args.command {
        Command::Run { pr, milestone } => runner
            .run(pr, milestone.as_deref())
            .await
            .map(Output::Summary),
        Command::Plan { pr } => runner.plan(pr).await.map(Output::Plan),
        Command::Pick { pr, milestone } => runner.pick(pr, &milestone).await.map(Output::Summary),
        Command::Report { pr, milestones } => runner
            .report(pr, &milestones)
            .await
            .map(|complete| Output::Report { complete }),
        Command::Publish { pr, milestone } => {
            runner.publish(pr, &milestone).await.map(Output::Summary)
        }
    }
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Pull request: #{}", summary.pr_number);

    if summary.outcome.is_resolution_failure() {
        println!("  Halted: {:?}", summary.outcome);
        return;
    }

    for attempt in &summary.attempts {
        match attempt.outcome.url() {
            Some(url) => println!("  {}: {} ({url})", attempt.milestone, attempt.outcome.as_str()),
            None => println!("  {}: {}", attempt.milestone, attempt.outcome.as_str()),
        }
    }
    println!("  Published: {}", summary.published());
    println!("  Failed: {}", summary.failed());
}
