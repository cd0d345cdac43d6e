use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::error::TabliftError;
use crate::extraction::{ExtractOptions, TableExtractor};
use crate::model::{ExtractedTable, Strategy};

/// Layout strategy backed by the tabula-java jar.
pub struct TabulaExtractor {
    java: String,
    jar: Option<PathBuf>,
}

impl TabulaExtractor {
    pub fn new(java: impl Into<String>, jar: Option<PathBuf>) -> Self {
        TabulaExtractor {
            java: java.into(),
            jar,
        }
    }

    /// Tabula needs both a jar on disk and a working `java`.
    pub fn is_available(java: &str, jar: Option<&Path>) -> bool {
        let Some(jar) = jar else {
            return false;
        };
        jar.is_file()
            && Command::new(java)
                .arg("-version")
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
    }
}

impl TableExtractor for TabulaExtractor {
    fn extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<ExtractedTable>, TabliftError> {
        let jar = match &self.jar {
            Some(jar) if jar.is_file() => jar,
            _ => {
                return Err(TabliftError::StrategyUnavailable {
                    strategy: Strategy::Tabula,
                })
            }
        };

        let output = Command::new(&self.java)
            .arg("-jar")
            .arg(jar)
            .arg("--pages")
            .arg(&options.pages)
            .arg("--guess")
            .arg("--format")
            .arg("JSON")
            .arg(path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TabliftError::StrategyUnavailable {
                        strategy: Strategy::Tabula,
                    }
                } else {
                    TabliftError::strategy(Strategy::Tabula, format!("failed to run java: {e}"))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(TabliftError::strategy(
                Strategy::Tabula,
                format!("tabula exited with code {code}: {stderr}"),
            ));
        }

        let tables = parse_table_set(&output.stdout)?;
        debug!(tables = tables.len(), "tabula export parsed");
        Ok(tables)
    }

    fn strategy(&self) -> Strategy {
        Strategy::Tabula
    }
}

/// Tables as printed by `tabula --format JSON`.
#[derive(Deserialize, Debug)]
#[serde(transparent)]
struct JsonTableSet(Vec<JsonTable>);

#[derive(Deserialize, Debug)]
struct JsonTable {
    #[serde(default)]
    extraction_method: String,
    #[serde(default)]
    data: Vec<JsonRow>,
}

#[derive(Deserialize, Debug)]
struct JsonRow(Vec<JsonCell>);

#[derive(Deserialize, Debug)]
struct JsonCell {
    #[serde(default)]
    text: String,
}

fn parse_table_set(bytes: &[u8]) -> Result<Vec<ExtractedTable>, TabliftError> {
    let JsonTableSet(tables) = serde_json::from_slice(bytes)
        .map_err(|e| TabliftError::strategy(Strategy::Tabula, format!("bad JSON output: {e}")))?;

    Ok(tables
        .into_iter()
        .filter(|t| !t.data.is_empty())
        .map(|t| {
            debug!(method = %t.extraction_method, rows = t.data.len(), "tabula table");
            let mut rows = t
                .data
                .into_iter()
                .map(|JsonRow(cells)| cells.into_iter().map(|c| c.text).collect::<Vec<_>>());
            let header = rows.next();
            ExtractedTable::new(header, rows.collect())
        })
        .collect())
}
