use std::path::Path;

use tablift_core::{read_workbook, TabliftError};

use crate::output;

pub fn run(workbook: &Path, output_format: &str) -> Result<(), TabliftError> {
    let sheets = read_workbook(workbook)?;

    match output_format {
        "json" => output::json::print(&sheets)?,
        _ => output::table::print_sheets(&sheets),
    }
    Ok(())
}
