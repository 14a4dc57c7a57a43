pub mod config;
pub mod contacts;
pub mod emergency;

use std::path::PathBuf;

use careline_core::Config;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Explicit `--config` path, or the default location.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(Config::default_path()?),
    }
}
