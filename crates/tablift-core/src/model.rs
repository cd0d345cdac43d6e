use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::TabliftError;

/// Label of the strategy that produced a set of tables.
///
/// The labels are part of the contract with collaborators. `Pdfplumber`
/// names the built-in cell-geometry strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Camelot,
    Tabula,
    Pdfplumber,
    TextFallback,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Camelot => "camelot",
            Strategy::Tabula => "tabula",
            Strategy::Pdfplumber => "pdfplumber",
            Strategy::TextFallback => "text_fallback",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extraction method requested by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Auto,
    Camelot,
    Tabula,
    Pdfplumber,
}

impl Method {
    /// Whether an external strategy may be attempted under this method.
    pub fn permits(&self, strategy: Strategy) -> bool {
        match self {
            Method::Auto => true,
            Method::Camelot => strategy == Strategy::Camelot,
            Method::Tabula => strategy == Strategy::Tabula,
            Method::Pdfplumber => strategy == Strategy::Pdfplumber,
        }
    }
}

impl FromStr for Method {
    type Err = TabliftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Method::Auto),
            "camelot" => Ok(Method::Camelot),
            "tabula" => Ok(Method::Tabula),
            "pdfplumber" => Ok(Method::Pdfplumber),
            _ => Err(TabliftError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Auto => write!(f, "auto"),
            Method::Camelot => write!(f, "camelot"),
            Method::Tabula => write!(f, "tabula"),
            Method::Pdfplumber => write!(f, "pdfplumber"),
        }
    }
}

/// Table detection flavor for the grid strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridFlavor {
    /// Ruled lines between cells.
    #[default]
    Lattice,
    /// Whitespace alignment between cells.
    Stream,
}

impl GridFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            GridFlavor::Lattice => "lattice",
            GridFlavor::Stream => "stream",
        }
    }
}

impl FromStr for GridFlavor {
    type Err = TabliftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lattice" => Ok(GridFlavor::Lattice),
            "stream" => Ok(GridFlavor::Stream),
            _ => Err(TabliftError::UnknownFlavor(s.to_string())),
        }
    }
}

impl fmt::Display for GridFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table as found on a page, before any header handling.
/// `None` marks a cell the extractor saw but could not read text from.
pub type RawGrid = Vec<Vec<Option<String>>>;

/// A single extracted table: optional header plus rows of cell text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTable {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl ExtractedTable {
    /// Build a table, padding the header and every row to a common width.
    pub fn new(header: Option<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        let width = header
            .iter()
            .chain(rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0);

        let pad = |mut row: Vec<String>| {
            row.resize(width, String::new());
            row
        };

        ExtractedTable {
            header: header.map(pad),
            rows: rows.into_iter().map(pad).collect(),
        }
    }

    /// A table without header; every row is data.
    pub fn positional(rows: Vec<Vec<String>>) -> Self {
        Self::new(None, rows)
    }

    /// Convert a raw grid, promoting the first row to a header when all of
    /// its values (missing ones included) are pairwise distinct.
    pub fn from_grid(grid: RawGrid) -> Result<Self, TabliftError> {
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Err(TabliftError::MalformedGrid(format!(
                "grid with {} row(s) has no columns",
                grid.len()
            )));
        }

        // Short rows count as padded with missing cells.
        let mut first_row = grid[0].clone();
        first_row.resize(width, None);
        let distinct = first_row.iter().collect::<HashSet<_>>().len() == first_row.len();

        let mut rows = grid
            .into_iter()
            .map(|row| row.into_iter().map(Option::unwrap_or_default).collect::<Vec<_>>());

        let header = if distinct { rows.next() } else { None };
        Ok(Self::new(header, rows.collect()))
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.rows.is_empty()
    }
}

/// Tables from one successful strategy. Never empty, and never holds a
/// table without header or rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    strategy: Strategy,
    tables: Vec<ExtractedTable>,
}

impl ExtractionResult {
    /// Drops empty tables; returns `None` when none are left.
    pub fn new(strategy: Strategy, tables: Vec<ExtractedTable>) -> Option<Self> {
        let tables: Vec<ExtractedTable> = tables.into_iter().filter(|t| !t.is_empty()).collect();
        if tables.is_empty() {
            None
        } else {
            Some(ExtractionResult { strategy, tables })
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn tables(&self) -> &[ExtractedTable] {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        rows.iter()
            .map(|r| r.iter().map(|c| Some(c.to_string())).collect())
            .collect()
    }

    #[test]
    fn repeated_first_row_is_kept_as_data() {
        let table = ExtractedTable::from_grid(grid(&[&["A", "A"], &["1", "2"]])).unwrap();
        assert!(table.header().is_none());
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0], vec!["A", "A"]);
    }

    #[test]
    fn distinct_first_row_becomes_header() {
        let table = ExtractedTable::from_grid(grid(&[&["A", "B"], &["1", "2"]])).unwrap();
        assert_eq!(table.header(), Some(&["A".to_string(), "B".to_string()][..]));
        assert_eq!(table.rows(), &[vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn repeated_missing_cells_block_promotion() {
        let table =
            ExtractedTable::from_grid(vec![vec![None, None], vec![Some("1".into()), None]])
                .unwrap();
        assert!(table.header().is_none());
        assert_eq!(table.rows()[0], vec!["", ""]);
        assert_eq!(table.rows()[1], vec!["1", ""]);
    }

    #[test]
    fn ragged_rows_are_padded() {
        let table = ExtractedTable::from_grid(vec![
            vec![Some("Name".into()), Some("Qty".into()), Some("Unit".into())],
            vec![Some("Bolt".into())],
        ])
        .unwrap();
        assert_eq!(table.header().map(|h| h.len()), Some(3));
        assert_eq!(table.rows()[0], vec!["Bolt", "", ""]);
    }

    #[test]
    fn empty_grid_is_malformed() {
        assert!(ExtractedTable::from_grid(vec![]).is_err());
        assert!(ExtractedTable::from_grid(vec![vec![]]).is_err());
    }

    #[test]
    fn extraction_result_rejects_empty_tables() {
        assert!(ExtractionResult::new(Strategy::Camelot, vec![]).is_none());
        let table = ExtractedTable::positional(vec![vec!["x".into()]]);
        let result = ExtractionResult::new(Strategy::Tabula, vec![table]).unwrap();
        assert_eq!(result.strategy(), Strategy::Tabula);
        assert_eq!(result.tables().len(), 1);
    }

    #[test]
    fn extraction_result_drops_tables_without_content() {
        let blank = ExtractedTable::positional(vec![]);
        assert!(blank.is_empty());
        assert!(ExtractionResult::new(Strategy::Camelot, vec![blank.clone()]).is_none());

        let table = ExtractedTable::positional(vec![vec!["x".into()]]);
        let result = ExtractionResult::new(Strategy::Camelot, vec![blank, table]).unwrap();
        assert_eq!(result.tables().len(), 1);
        assert_eq!(result.tables()[0].rows()[0], vec!["x"]);
    }

    #[test]
    fn method_gates_external_strategies() {
        assert!(Method::Auto.permits(Strategy::Camelot));
        assert!(Method::Auto.permits(Strategy::Tabula));
        assert!(Method::Camelot.permits(Strategy::Camelot));
        assert!(!Method::Camelot.permits(Strategy::Tabula));
        assert!(!Method::Pdfplumber.permits(Strategy::Tabula));
    }

    #[test]
    fn parse_method_and_flavor() {
        assert_eq!("Tabula".parse::<Method>().unwrap(), Method::Tabula);
        assert!("ocr".parse::<Method>().is_err());
        assert_eq!(" stream ".parse::<GridFlavor>().unwrap(), GridFlavor::Stream);
        assert!("grid".parse::<GridFlavor>().is_err());
    }

    #[test]
    fn strategy_labels() {
        assert_eq!(Strategy::TextFallback.to_string(), "text_fallback");
        assert_eq!(
            serde_json::to_string(&Strategy::Pdfplumber).unwrap(),
            "\"pdfplumber\""
        );
    }
}
