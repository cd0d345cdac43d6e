use serde::Serialize;
use std::path::PathBuf;

use crate::model::Strategy;

/// What happened when a strategy was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Produced this many tables.
    Succeeded { tables: usize },
    /// Ran without finding anything.
    Empty,
    /// Ran and failed.
    Failed { message: String },
    /// The capability was missing at run time.
    Unavailable,
}

/// One step of the extraction cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub strategy: Strategy,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

impl Attempt {
    pub fn new(strategy: Strategy, outcome: AttemptOutcome) -> Self {
        Attempt { strategy, outcome }
    }

    /// Line for the failure summary, prefixed with the strategy label.
    /// `None` for attempts that are not reported.
    pub fn failure_line(&self) -> Option<String> {
        match &self.outcome {
            AttemptOutcome::Failed { message } => {
                Some(format!("{} error: {}", self.strategy, message))
            }
            AttemptOutcome::Empty if self.strategy == Strategy::TextFallback => {
                Some(format!("{}: no text found", self.strategy))
            }
            AttemptOutcome::Empty => Some(format!("{}: no tables found", self.strategy)),
            AttemptOutcome::Succeeded { .. } | AttemptOutcome::Unavailable => None,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// Where the workbook was written.
    pub destination: PathBuf,
    /// Strategy that produced the tables.
    pub strategy: Strategy,
    /// Number of tables (and sheets) written.
    pub tables: usize,
    pub attempts: Vec<Attempt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_lines_name_the_strategy() {
        let failed = Attempt::new(
            Strategy::Camelot,
            AttemptOutcome::Failed {
                message: "ghostscript missing".into(),
            },
        );
        assert_eq!(
            failed.failure_line().as_deref(),
            Some("camelot error: ghostscript missing")
        );
        assert_eq!(
            Attempt::new(Strategy::Pdfplumber, AttemptOutcome::Empty)
                .failure_line()
                .as_deref(),
            Some("pdfplumber: no tables found")
        );
        assert_eq!(
            Attempt::new(Strategy::TextFallback, AttemptOutcome::Empty)
                .failure_line()
                .as_deref(),
            Some("text_fallback: no text found")
        );
        assert_eq!(
            Attempt::new(Strategy::Tabula, AttemptOutcome::Unavailable).failure_line(),
            None
        );
    }

    #[test]
    fn attempt_serializes_flat() {
        let attempt = Attempt::new(Strategy::Tabula, AttemptOutcome::Succeeded { tables: 2 });
        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "strategy": "tabula", "outcome": "succeeded", "tables": 2 })
        );

        let json = serde_json::to_value(Attempt::new(Strategy::Camelot, AttemptOutcome::Empty))
            .unwrap();
        assert_eq!(json, serde_json::json!({ "strategy": "camelot", "outcome": "empty" }));
    }
}
