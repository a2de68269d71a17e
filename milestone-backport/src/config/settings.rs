//! Backport settings deserialization.

use super::ConfigError;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Settings that shape how backports are performed and reported.
///
/// Every key is optional; a missing file or an empty file yields the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct BackportConfig {
    /// Git remote that milestone branches are fetched from and pushed to.
    pub remote: String,

    /// The main line the source pull request landed on.
    pub main_branch: String,

    /// Label marking a pull request that still needs backporting.
    pub needs_cherrypick_label: String,

    /// Label added when any backport could not be completed automatically.
    pub failure_label: String,

    /// Prefix of the label that categorises a pull request (e.g. `category:bugfix`).
    pub category_label_prefix: String,

    /// File name of the workflow that runs the automation, for deep links.
    pub workflow_file: String,

    /// Command name shown in recovery instructions.
    pub command_name: String,
}

impl Default for BackportConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            main_branch: "main".to_string(),
            needs_cherrypick_label: "needs-cherrypick".to_string(),
            failure_label: "auto-cherry-picking-failed".to_string(),
            category_label_prefix: "category:".to_string(),
            workflow_file: "auto-cherry-picker.yaml".to_string(),
            command_name: "milestone-backport".to_string(),
        }
    }
}

impl BackportConfig {
    /// Loads and validates settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file can't be read, parsed or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading backport config");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;

        config.validate(path)?;
        Ok(config)
    }

    /// Validates the loaded settings.
    pub(crate) fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let path_str = path.display().to_string();

        let required = [
            ("remote", &self.remote),
            ("main-branch", &self.main_branch),
            ("needs-cherrypick-label", &self.needs_cherrypick_label),
            ("failure-label", &self.failure_label),
            ("workflow-file", &self.workflow_file),
            ("command-name", &self.command_name),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    path: path_str,
                    message: format!("{key} must not be empty"),
                });
            }
        }

        if !self.category_label_prefix.ends_with(':') {
            return Err(ConfigError::ValidationError {
                path: path_str,
                message: "category-label-prefix must end with ':'".to_string(),
            });
        }

        Ok(())
    }
}
