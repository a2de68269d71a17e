//! Repository identification.

use crate::config::ConfigError;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Environment variable GitHub Actions sets to `owner/name`.
pub const REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";

/// A hosted repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoSlug {
    /// Creates a slug from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Reads the slug from [`REPOSITORY_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRepository`] if the variable is unset or
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let value = std::env::var(REPOSITORY_ENV).unwrap_or_default();
        value.parse()
    }

    /// Full name in `owner/name` form.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Web URL of the repository, also usable as a fetch URL.
    #[must_use]
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }

    /// Deep link to a workflow's run list.
    #[must_use]
    pub fn workflow_url(&self, workflow_file: &str) -> String {
        format!("{}/actions/workflows/{}", self.html_url(), workflow_file)
    }
}

impl FromStr for RepoSlug {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRepository {
            value: value.to_string(),
        };

        let value = value.trim();
        // Accept clone/web URLs as well as bare slugs.
        let path = if value.contains("://") {
            let url = Url::parse(value).map_err(|_| invalid())?;
            url.path().trim_matches('/').to_string()
        } else {
            value.to_string()
        };

        let (owner, name) = path.split_once('/').ok_or_else(invalid)?;
        let name = name.strip_suffix(".git").unwrap_or(name);
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self::new(owner, name))
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
