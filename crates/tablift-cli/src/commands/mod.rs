pub mod capabilities;
pub mod convert;
pub mod inspect;
pub mod pages;

use std::path::{Path, PathBuf};

use tablift_core::config::{load_config, ToolConfig};
use tablift_core::TabliftError;

/// Configuration from `--config` (defaults without one), with a
/// `--tabula-jar` override applied.
pub fn tool_config(
    path: Option<&Path>,
    tabula_jar: Option<PathBuf>,
) -> Result<ToolConfig, TabliftError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ToolConfig::default(),
    };
    if tabula_jar.is_some() {
        config.tabula_jar = tabula_jar;
    }
    Ok(config)
}
