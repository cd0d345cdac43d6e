use std::path::Path;

use tracing::debug;

use crate::error::TabliftError;
use crate::extraction::{DocumentSource, ExtractOptions, TableExtractor};
use crate::model::{ExtractedTable, Strategy};

/// Cell-geometry strategy: tables found from the positions of words on each
/// page of an open document.
pub struct GeometryExtractor<'a> {
    documents: &'a dyn DocumentSource,
}

impl<'a> GeometryExtractor<'a> {
    pub fn new(documents: &'a dyn DocumentSource) -> Self {
        GeometryExtractor { documents }
    }
}

impl TableExtractor for GeometryExtractor<'_> {
    fn extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<ExtractedTable>, TabliftError> {
        let document = self.documents.open(path)?;
        let pages = match &options.page_set {
            Some(set) => set.resolve(document.page_count()),
            None => (1..=document.page_count()).collect(),
        };

        let mut tables = Vec::new();
        for page in pages {
            for grid in document.page_tables(page)? {
                match ExtractedTable::from_grid(grid) {
                    Ok(table) => tables.push(table),
                    Err(e) => debug!(page, error = %e, "skipping grid"),
                }
            }
        }

        debug!(
            backend = self.documents.backend_name(),
            tables = tables.len(),
            "geometry extraction finished"
        );
        Ok(tables)
    }

    fn strategy(&self) -> Strategy {
        Strategy::Pdfplumber
    }
}
