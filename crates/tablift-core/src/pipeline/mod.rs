pub mod cascade;
pub mod outcome;

pub use cascade::{extract, TEXT_FALLBACK_HEADER};
pub use outcome::{Attempt, AttemptOutcome, Conversion};

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{CapabilitySet, ToolConfig};
use crate::error::TabliftError;
use crate::extraction::camelot::CamelotExtractor;
use crate::extraction::pdftotext::PdftotextSource;
use crate::extraction::tabula::TabulaExtractor;
use crate::extraction::{DocumentSource, TableExtractor};
use crate::model::{GridFlavor, Method};
use crate::workbook::write_workbook;

/// A request to convert one PDF into one workbook.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub method: Method,
    /// Page selector, e.g. `all`, `2-5` or `1,3`.
    pub pages: String,
    pub grid_flavor: GridFlavor,
}

impl ConvertRequest {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        ConvertRequest {
            source: source.into(),
            destination: destination.into(),
            method: Method::Auto,
            pages: "all".into(),
            grid_flavor: GridFlavor::Lattice,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn pages(mut self, pages: impl Into<String>) -> Self {
        self.pages = pages.into();
        self
    }

    pub fn grid_flavor(mut self, flavor: GridFlavor) -> Self {
        self.grid_flavor = flavor;
        self
    }
}

/// The strategies and document backend a conversion runs with.
pub struct Toolkit {
    pub capabilities: CapabilitySet,
    /// Grid strategy (Camelot).
    pub grid: Box<dyn TableExtractor>,
    /// Layout strategy (Tabula).
    pub layout: Box<dyn TableExtractor>,
    /// Backend for the geometry and text strategies.
    pub documents: Box<dyn DocumentSource>,
}

impl Toolkit {
    /// Production toolkit. Probes the external tools once.
    pub fn from_config(config: &ToolConfig) -> Self {
        let capabilities = CapabilitySet::detect(config);
        info!(
            camelot = capabilities.camelot,
            tabula = capabilities.tabula,
            "detected capabilities"
        );
        Toolkit {
            capabilities,
            grid: Box::new(CamelotExtractor::new(config.camelot.as_str())),
            layout: Box::new(TabulaExtractor::new(
                config.java.as_str(),
                config.tabula_jar.clone(),
            )),
            documents: Box::new(PdftotextSource::new(
                config.pdftotext.as_str(),
                config.geometry.clone(),
            )),
        }
    }
}

/// Extract tables from `request.source` and write them to
/// `request.destination`, one sheet per table.
pub fn convert(request: &ConvertRequest, toolkit: &Toolkit) -> Result<Conversion, TabliftError> {
    let (result, attempts) = extract(request, toolkit)?;
    let destination = write_workbook(result.tables(), &request.destination)?;

    info!(
        destination = %destination.display(),
        strategy = %result.strategy(),
        tables = result.tables().len(),
        "conversion finished"
    );

    Ok(Conversion {
        destination,
        strategy: result.strategy(),
        tables: result.tables().len(),
        attempts,
    })
}

/// Whether `path` has a `.pdf` extension, in any letter case.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Workbook path next to `source`: same base name, `.xlsx` extension.
pub fn default_destination(source: &Path) -> PathBuf {
    source.with_extension("xlsx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let request = ConvertRequest::new("in.pdf", "out.xlsx");
        assert_eq!(request.method, Method::Auto);
        assert_eq!(request.pages, "all");
        assert_eq!(request.grid_flavor, GridFlavor::Lattice);

        let request = request
            .method(Method::Tabula)
            .pages("2-3")
            .grid_flavor(GridFlavor::Stream);
        assert_eq!(request.method, Method::Tabula);
        assert_eq!(request.pages, "2-3");
        assert_eq!(request.grid_flavor, GridFlavor::Stream);
    }

    #[test]
    fn pdf_extension_any_case() {
        assert!(is_pdf_path(Path::new("report.pdf")));
        assert!(is_pdf_path(Path::new("dir/REPORT.PDF")));
        assert!(!is_pdf_path(Path::new("report.xlsx")));
        assert!(!is_pdf_path(Path::new("pdf")));
    }

    #[test]
    fn destination_sits_next_to_source() {
        assert_eq!(
            default_destination(Path::new("/data/q3 report.PDF")),
            PathBuf::from("/data/q3 report.xlsx")
        );
    }
}
