use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tracing::debug;

use crate::error::TabliftError;
use crate::extraction::{ExtractOptions, TableExtractor};
use crate::model::{ExtractedTable, Strategy};

/// Grid strategy backed by the Camelot command line tool.
///
/// Camelot detects tables from ruled lines (`lattice`) or text alignment
/// (`stream`). Tables are exported as one JSON file per table into a
/// temporary directory and read back in page order.
pub struct CamelotExtractor {
    command: String,
}

impl CamelotExtractor {
    pub fn new(command: impl Into<String>) -> Self {
        CamelotExtractor {
            command: command.into(),
        }
    }

    /// Check if the camelot CLI can be started.
    pub fn is_available(command: &str) -> bool {
        Command::new(command)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl Default for CamelotExtractor {
    fn default() -> Self {
        Self::new("camelot")
    }
}

impl TableExtractor for CamelotExtractor {
    fn extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<ExtractedTable>, TabliftError> {
        let out_dir = tempfile::tempdir()
            .map_err(|e| TabliftError::strategy(Strategy::Camelot, e.to_string()))?;
        let target = out_dir.path().join("tables.json");

        let output = Command::new(&self.command)
            .arg("--pages")
            .arg(&options.pages)
            .arg("--format")
            .arg("json")
            .arg("--output")
            .arg(&target)
            .arg(options.flavor.as_str())
            .arg(path)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TabliftError::StrategyUnavailable {
                        strategy: Strategy::Camelot,
                    }
                } else {
                    let message = format!("failed to run camelot: {e}");
                    TabliftError::strategy(Strategy::Camelot, message)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(TabliftError::strategy(
                Strategy::Camelot,
                format!("camelot exited with code {code}: {stderr}"),
            ));
        }

        let mut exported = Vec::new();
        for entry in std::fs::read_dir(out_dir.path())? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(position) = export_position(name) {
                exported.push((position, path));
            }
        }
        exported.sort();

        debug!(files = exported.len(), flavor = %options.flavor, "camelot export finished");

        let mut tables = Vec::new();
        for (_, file) in exported {
            let table = records_to_table(&std::fs::read(&file)?)?;
            if !table.is_empty() {
                tables.push(table);
            }
        }
        Ok(tables)
    }

    fn strategy(&self) -> Strategy {
        Strategy::Camelot
    }
}

/// `(page, table)` from an export name like `tables-page-2-table-1.json`.
fn export_position(file_name: &str) -> Option<(u32, u32)> {
    let stem = file_name.strip_suffix(".json")?;
    let (rest, table) = stem.rsplit_once("-table-")?;
    let (_, page) = rest.rsplit_once("-page-")?;
    Some((page.parse().ok()?, table.parse().ok()?))
}

/// Camelot writes each table as records keyed by column index:
/// `[{"0": "a", "1": "b"}, ...]`.
fn records_to_table(bytes: &[u8]) -> Result<ExtractedTable, TabliftError> {
    let records: Vec<BTreeMap<String, Value>> = serde_json::from_slice(bytes)
        .map_err(|e| TabliftError::strategy(Strategy::Camelot, format!("bad export: {e}")))?;

    let rows = records
        .into_iter()
        .map(|record| {
            let mut cells: Vec<(u32, String)> = record
                .into_iter()
                .map(|(key, value)| (key.parse().unwrap_or(u32::MAX), cell_text(value)))
                .collect();
            cells.sort_by_key(|(column, _)| *column);
            cells.into_iter().map(|(_, text)| text).collect()
        })
        .collect();

    Ok(ExtractedTable::positional(rows))
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
