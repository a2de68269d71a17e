//! Copy-pasteable recovery instructions.

use crate::attempt::BackportAttempt;
use crate::context::BackportContext;
use crate::locator::SourcePullRequest;
use crate::vcs::FETCH_HEAD;

/// Shell commands a human runs to finish a backport by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryRecipe {
    commands: Vec<String>,
    publish_command: String,
}

impl RecoveryRecipe {
    pub fn new(commands: Vec<String>, publish_command: String) -> Self {
        Self {
            commands,
            publish_command,
        }
    }

    /// Steps to redo the cherry-pick from scratch on a clean checkout.
    #[must_use]
    pub fn cherry_pick(
        ctx: &BackportContext,
        source: &SourcePullRequest,
        attempt: &BackportAttempt,
    ) -> Self {
        let url = ctx.repo().html_url();
        let commands = vec![
            format!("git fetch {url} {}", ctx.config().main_branch),
            format!("git fetch {url} {}", attempt.milestone),
            format!("git checkout -b {} {FETCH_HEAD}", attempt.branch_name),
            format!("git cherry-pick {}", source.merge_commit_sha),
        ];
        Self::new(commands, publish_command(ctx, source, attempt))
    }

    /// Steps to retry only the publish step of an already applied cherry-pick.
    #[must_use]
    pub fn publish_retry(
        ctx: &BackportContext,
        source: &SourcePullRequest,
        attempt: &BackportAttempt,
    ) -> Self {
        let publish = publish_command(ctx, source, attempt);
        let commands = vec![format!("git checkout {}", attempt.branch_name), publish.clone()];
        Self::new(commands, publish)
    }

    /// The commands as a newline-separated script.
    #[must_use]
    pub fn script(&self) -> String {
        self.commands.join("\n")
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// The command that pushes the branch and opens the pull request.
    pub fn publish_command(&self) -> &str {
        &self.publish_command
    }
}

fn publish_command(
    ctx: &BackportContext,
    source: &SourcePullRequest,
    attempt: &BackportAttempt,
) -> String {
    format!(
        "{} --repo {} publish {} {}",
        ctx.config().command_name,
        ctx.repo(),
        source.number,
        attempt.milestone
    )
}
