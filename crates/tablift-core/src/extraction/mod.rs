pub mod camelot;
pub mod geometry;
pub mod pdftotext;
pub mod table;
pub mod tabula;

use std::path::Path;

use crate::error::TabliftError;
use crate::model::{ExtractedTable, GridFlavor, RawGrid, Strategy};
use crate::pages::PageSet;

/// Parameters handed to every strategy adapter.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// The page selector exactly as the user typed it. External tools get
    /// this string unparsed.
    pub pages: String,
    /// The parsed selector; `None` means every page.
    pub page_set: Option<PageSet>,
    pub flavor: GridFlavor,
}

/// A table-extraction strategy behind a uniform contract.
pub trait TableExtractor: Send + Sync {
    /// Extract all tables from the PDF at `path`.
    ///
    /// Fails with `StrategyUnavailable` when the capability is missing from
    /// this environment, or with a strategy error when it ran and failed.
    fn extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<ExtractedTable>, TabliftError>;

    /// Label reported when this strategy produces the result.
    fn strategy(&self) -> Strategy;
}

/// An open PDF document. Dropping the handle releases it.
pub trait PdfDocument {
    fn page_count(&self) -> usize;

    /// Raw table grids found on a 1-based page.
    fn page_tables(&self, page_number: usize) -> Result<Vec<RawGrid>, TabliftError>;

    /// Plain text of a 1-based page, `None` when the page has none.
    fn page_text(&self, page_number: usize) -> Result<Option<String>, TabliftError>;
}

/// Backend that opens PDF documents for the geometry and text strategies.
pub trait DocumentSource: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, TabliftError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
