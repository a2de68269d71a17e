//! Feedback reporting error types.

use crate::forge::ForgeError;
use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that can occur while reporting back on the source pull request.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The hosting platform rejected a label or comment.
    #[error(transparent)]
    Forge(#[from] ForgeError),

    /// A comment could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
