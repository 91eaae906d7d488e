//! Loading `quality.yml` from disk.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use qgate_core::{QgateError, Result};
use tracing::debug;

use crate::model::Config;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "quality.yml";

/// Read and parse a configuration file.
///
/// A missing file is reported as [`QgateError::ConfigNotFound`], malformed
/// YAML as [`QgateError::ConfigInvalid`].
pub fn load_config(path: &Path) -> Result<Config> {
    debug!("Loading configuration from {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => QgateError::config_not_found_with_source(path, e),
        _ => QgateError::io("reading configuration", path, e),
    })?;

    let config = Config::from_yaml_str(&content)
        .map_err(|e| QgateError::config_invalid(path, e.to_string()))?;

    debug!(
        tools = config.tools.len(),
        groups = config.hooks.len(),
        "configuration loaded"
    );
    Ok(config)
}
