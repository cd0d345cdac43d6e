use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TabliftError;
use crate::extraction::camelot::CamelotExtractor;
use crate::extraction::table::TableFinderSettings;
use crate::extraction::tabula::TabulaExtractor;

/// Default ceiling for input PDFs: 50 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

/// External tools and tolerances used by a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub pdftotext: String,
    pub camelot: String,
    pub java: String,
    /// Path to the tabula-java jar. Tabula is unavailable without it.
    pub tabula_jar: Option<PathBuf>,
    pub max_input_bytes: u64,
    pub geometry: TableFinderSettings,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            pdftotext: "pdftotext".into(),
            camelot: "camelot".into(),
            java: "java".into(),
            tabula_jar: None,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            geometry: TableFinderSettings::default(),
        }
    }
}

/// Load a tool configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<ToolConfig, TabliftError> {
    let content = std::fs::read_to_string(path).map_err(|e| TabliftError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_config(&content, path)
}

/// Parse a tool configuration from a JSON string.
pub fn parse_config(json: &str, source: &Path) -> Result<ToolConfig, TabliftError> {
    let config: ToolConfig = serde_json::from_str(json).map_err(|e| TabliftError::ConfigLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &ToolConfig) -> Result<(), TabliftError> {
    for (name, command) in [
        ("pdftotext", &config.pdftotext),
        ("camelot", &config.camelot),
        ("java", &config.java),
    ] {
        if command.trim().is_empty() {
            return Err(TabliftError::ConfigInvalid(format!(
                "{} command must not be empty",
                name
            )));
        }
    }

    if config.max_input_bytes == 0 {
        return Err(TabliftError::ConfigInvalid(
            "max_input_bytes must be positive".into(),
        ));
    }

    let g = &config.geometry;
    for (name, value) in [
        ("row_tolerance", g.row_tolerance),
        ("cell_gap", g.cell_gap),
        ("row_gap", g.row_gap),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(TabliftError::ConfigInvalid(format!(
                "geometry.{} must be a positive number, got {}",
                name, value
            )));
        }
    }

    if g.min_rows == 0 {
        return Err(TabliftError::ConfigInvalid(
            "geometry.min_rows must be at least 1".into(),
        ));
    }
    if g.min_columns < 2 {
        return Err(TabliftError::ConfigInvalid(
            "geometry.min_columns must be at least 2".into(),
        ));
    }

    Ok(())
}

/// Which external strategies this environment can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CapabilitySet {
    pub camelot: bool,
    pub tabula: bool,
}

impl CapabilitySet {
    /// Probe the configured tools once.
    pub fn detect(config: &ToolConfig) -> Self {
        CapabilitySet {
            camelot: CamelotExtractor::is_available(&config.camelot),
            tabula: TabulaExtractor::is_available(&config.java, config.tabula_jar.as_deref()),
        }
    }

    pub fn none() -> Self {
        CapabilitySet::default()
    }

    pub fn all() -> Self {
        CapabilitySet {
            camelot: true,
            tabula: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<ToolConfig, TabliftError> {
        parse_config(json, Path::new("tablift.json"))
    }

    #[test]
    fn empty_object_gives_defaults() {
        let config = parse("{}").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.max_input_bytes, 52_428_800);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = parse(
            r#"{
                "tabula_jar": "/opt/tabula/tabula.jar",
                "geometry": { "min_rows": 3 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.tabula_jar, Some(PathBuf::from("/opt/tabula/tabula.jar")));
        assert_eq!(config.geometry.min_rows, 3);
        assert_eq!(config.geometry.min_columns, 2);
        assert_eq!(config.camelot, "camelot");
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            parse(r#"{ "camelot": " " }"#),
            Err(TabliftError::ConfigInvalid(_))
        ));
        assert!(matches!(
            parse(r#"{ "max_input_bytes": 0 }"#),
            Err(TabliftError::ConfigInvalid(_))
        ));
        assert!(matches!(
            parse(r#"{ "geometry": { "cell_gap": -1.0 } }"#),
            Err(TabliftError::ConfigInvalid(_))
        ));
        assert!(matches!(
            parse(r#"{ "geometry": { "min_columns": 1 } }"#),
            Err(TabliftError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn bad_json_is_a_load_error() {
        let err = parse("{ nope").unwrap_err();
        assert!(matches!(err, TabliftError::ConfigLoad { .. }));
        assert!(err.to_string().contains("tablift.json"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_config(Path::new("/nonexistent/tablift.json")).unwrap_err();
        assert!(matches!(err, TabliftError::ConfigLoad { .. }));
    }

    #[test]
    fn capabilities_without_jar_have_no_tabula() {
        let config = ToolConfig {
            camelot: "tablift-no-such-camelot".into(),
            ..ToolConfig::default()
        };
        let caps = CapabilitySet::detect(&config);
        assert!(!caps.camelot);
        assert!(!caps.tabula);
        assert_eq!(caps, CapabilitySet::none());
    }
}
