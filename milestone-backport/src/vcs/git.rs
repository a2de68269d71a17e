//! [`Vcs`] implementation that shells out to `git`.

use super::{CherryPickResult, Vcs, VcsError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs git commands inside one checkout.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Creates a driver for the checkout at `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Returns the checkout root.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Runs git and returns its output regardless of exit status.
    async fn output(&self, args: &[&str]) -> Result<Output, VcsError> {
        debug!(workdir = %self.workdir.display(), "git {}", args.join(" "));

        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| VcsError::Spawn {
                command: args.join(" "),
                source: e,
            })
    }

    /// Runs git and fails on a non-zero exit status.
    async fn run(&self, args: &[&str]) -> Result<Output, VcsError> {
        let output = self.output(args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VcsError::CommandFailed {
                command: args.join(" "),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn fetch(&self, remote: &str, refspec: &str, depth: u32) -> Result<(), VcsError> {
        let depth = format!("--depth={depth}");
        self.run(&["fetch", "--no-tags", &depth, remote, refspec])
            .await?;
        Ok(())
    }

    async fn checkout_new_branch(&self, branch: &str, start_point: &str) -> Result<(), VcsError> {
        let head_ref = format!("refs/heads/{branch}");
        let existing = self
            .output(&["show-ref", "--verify", "--quiet", &head_ref])
            .await?;
        if existing.status.success() {
            return Err(VcsError::BranchExists {
                branch: branch.to_string(),
            });
        }

        self.run(&["checkout", "-b", branch, start_point]).await?;
        Ok(())
    }

    async fn cherry_pick(&self, sha: &str) -> Result<CherryPickResult, VcsError> {
        let output = self.output(&["cherry-pick", sha]).await?;

        if output.status.success() {
            return Ok(CherryPickResult::Applied);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(sha, stderr = %stderr.trim(), "git cherry-pick did not apply cleanly");
        Ok(CherryPickResult::Conflicted)
    }

    async fn abort_cherry_pick(&self) -> Result<(), VcsError> {
        self.run(&["cherry-pick", "--abort"]).await?;
        Ok(())
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.run(&["push", "-u", remote, branch]).await?;
        Ok(())
    }

    async fn is_clean(&self) -> Result<bool, VcsError> {
        let output = self.run(&["status", "--porcelain"]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim().is_empty())
    }
}
