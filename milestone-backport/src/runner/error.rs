//! Runner error types.

use crate::config::ConfigError;
use crate::feedback::ReportError;
use crate::forge::ForgeError;

/// Errors that stop a run.
///
/// Per-milestone failures are not errors; they are recorded as attempt
/// outcomes and reported on the pull request.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Settings file loading errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// GitHub API errors outside a single attempt.
    #[error(transparent)]
    Forge(#[from] ForgeError),

    /// Feedback could not be posted.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The environment isn't fit for a run; nothing was changed.
    #[error("Precondition failed: {message}")]
    Precondition { message: String },
}
