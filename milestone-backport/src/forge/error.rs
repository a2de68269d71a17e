//! Hosting platform error types.

use thiserror::Error;

/// Errors that can occur while talking to the hosting platform.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// A request failed outside of the GitHub client (e.g. a custom forge).
    #[error("Request failed: {message}")]
    RequestFailed { message: String },
}
