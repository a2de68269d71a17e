//! Runner configuration.

use crate::forge::RepoSlug;
use std::path::{Path, PathBuf};

/// Switches for a backport run, as given on the command line.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// GitHub token used for API calls.
    token: String,
    /// Repository the source pull request lives in.
    repo: RepoSlug,
    /// Checkout the backports are prepared in.
    workdir: PathBuf,
    /// Explicit settings file; the conventional location is used otherwise.
    config_path: Option<PathBuf>,
    /// Whether to log writes instead of performing them.
    dry_run: bool,
    /// Whether to prompt on the terminal for a missing category label.
    interactive: bool,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(token: String, repo: RepoSlug, workdir: PathBuf) -> Self {
        Self {
            token,
            repo,
            workdir,
            config_path: None,
            dry_run: false,
            interactive: false,
        }
    }

    /// Sets an explicit settings file.
    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    /// Enables or disables dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enables or disables the category label prompt.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the target repository.
    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    /// Returns the checkout root.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Returns the explicit settings file, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns whether the category label prompt is enabled.
    pub fn interactive(&self) -> bool {
        self.interactive
    }
}
