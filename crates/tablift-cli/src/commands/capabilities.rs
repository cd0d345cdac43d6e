use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use tablift_core::extraction::pdftotext::PdftotextSource;
use tablift_core::{CapabilitySet, TabliftError};

use crate::output;

/// Availability of every strategy, in cascade order.
#[derive(Debug, Serialize)]
pub struct CapabilityReport {
    pub camelot: bool,
    pub tabula: bool,
    pub pdfplumber: bool,
    pub text_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabula_jar: Option<PathBuf>,
}

pub fn run(
    config: Option<PathBuf>,
    tabula_jar: Option<PathBuf>,
    output_format: &str,
) -> Result<(), TabliftError> {
    let config = super::tool_config(config.as_deref(), tabula_jar)?;
    let external = CapabilitySet::detect(&config);
    // Geometry and text fallback both read the document through pdftotext.
    let pdftotext = PdftotextSource::is_available(&config.pdftotext);
    debug!(camelot = external.camelot, tabula = external.tabula, pdftotext, "capabilities probed");

    let report = CapabilityReport {
        camelot: external.camelot,
        tabula: external.tabula,
        pdfplumber: pdftotext,
        text_fallback: pdftotext,
        tabula_jar: config.tabula_jar,
    };

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_capabilities(&report),
    }
    Ok(())
}
