pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod pages;
pub mod pipeline;
pub mod workbook;

pub use config::{load_config, CapabilitySet, ToolConfig};
pub use error::TabliftError;
pub use model::{ExtractedTable, ExtractionResult, GridFlavor, Method, Strategy};
pub use pages::{parse_pages, PageSet};
pub use pipeline::{
    convert, default_destination, extract, is_pdf_path, Attempt, AttemptOutcome, Conversion,
    ConvertRequest, Toolkit,
};
pub use workbook::{read_workbook, write_workbook, SheetContents};
