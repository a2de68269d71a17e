//! Version control error types.

use thiserror::Error;

/// Errors that can occur while driving git.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The git binary could not be started.
    #[error("Failed to execute git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// git ran and exited with a non-zero status.
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The branch to create is left over in the checkout from an earlier run.
    #[error("Local branch '{branch}' already exists from an earlier attempt; delete it with `git branch -D {branch}` and retry")]
    BranchExists { branch: String },

    /// A branch name is not a valid git reference name.
    #[error("Invalid branch name '{name}': {message}")]
    InvalidBranchName { name: String, message: String },
}
