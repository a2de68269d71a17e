//! Configuration loading.
//!
//! Backport settings live in an optional TOML file. When no path is given
//! explicitly, `.github/backport.toml` inside the working directory is used
//! if it exists, otherwise built-in defaults apply.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::BackportConfig;

use std::path::Path;
use tracing::{debug, info};

/// Conventional location of the settings file relative to the checkout root.
pub const DEFAULT_CONFIG_PATH: &str = ".github/backport.toml";

/// Resolves the settings for a run.
///
/// # Arguments
///
/// * `explicit` - Path passed by the caller; must exist when given
/// * `workdir` - Checkout root searched for [`DEFAULT_CONFIG_PATH`]
///
/// # Errors
///
/// Returns [`ConfigError`] if a config file exists but can't be loaded.
pub fn resolve_config(explicit: Option<&Path>, workdir: &Path) -> Result<BackportConfig, ConfigError> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "Using backport config");
        return BackportConfig::load(path);
    }

    let conventional = workdir.join(DEFAULT_CONFIG_PATH);
    if conventional.exists() {
        info!(path = %conventional.display(), "Using backport config");
        return BackportConfig::load(&conventional);
    }

    debug!("No backport config found, using defaults");
    Ok(BackportConfig::default())
}
