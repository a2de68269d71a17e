#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod attempt;
pub mod cherry_pick;
pub mod config;
pub mod context;
pub mod feedback;
pub mod forge;
pub mod locator;
pub mod materialize;
pub mod milestones;
pub mod publish;
pub mod rate_limit;
pub mod runner;
pub mod summary;
pub mod templates;
pub mod vcs;

pub use attempt::{branch_name, AttemptOutcome, BackportAttempt};
pub use config::{resolve_config, BackportConfig, ConfigError, DEFAULT_CONFIG_PATH};
pub use context::BackportContext;
pub use feedback::{
    report_attempt_failure, report_attempts, report_locate_failure, report_no_milestones,
    report_rediscovered, ReportError,
};
pub use forge::{DryRunForge, Forge, ForgeError, GitHubForge, RepoSlug};
pub use locator::{locate, LocateError, SourcePullRequest};
pub use milestones::{coerce_version, order_from, resolve_milestones};
pub use publish::{publish, recovery_recipe, RecoveryRecipe};
pub use rate_limit::{
    check_core_rate_limit, ensure_core_rate_limit, wait_if_needed, RateLimitInfo,
};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use summary::{RunOutcome, RunPlan, RunSummary};
pub use templates::{create_handlebars_registry, generate_pr_title, TemplateError, TemplateRenderer};
pub use vcs::{CherryPickResult, DryRunVcs, GitCli, Vcs, VcsError};
