use clap::Args;
use std::path::PathBuf;
use tracing::debug;

use tablift_core::{
    convert, default_destination, is_pdf_path, ConvertRequest, GridFlavor, Method, TabliftError,
    Toolkit,
};

use crate::output;

#[derive(Args)]
pub struct ConvertArgs {
    /// Path to the PDF file
    pub input_file: PathBuf,

    /// Workbook to write (default: next to the PDF, with an .xlsx extension)
    #[arg(short = 'o', long = "out", value_name = "XLSX")]
    pub out: Option<PathBuf>,

    /// Extraction method: auto, camelot, tabula or pdfplumber
    #[arg(short, long, default_value = "auto")]
    pub method: String,

    /// Pages to extract: all, a range like 2-5, or a list like 1,3
    #[arg(short, long, default_value = "all")]
    pub pages: String,

    /// Camelot table flavor: lattice or stream
    #[arg(long, default_value = "lattice")]
    pub flavor: String,

    /// JSON tool configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tabula jar (overrides the configuration file)
    #[arg(long, value_name = "JAR")]
    pub tabula_jar: Option<PathBuf>,

    /// Output format: table (default) or json
    #[arg(long, default_value = "table")]
    pub output: String,
}

pub fn run(args: ConvertArgs) -> Result<(), TabliftError> {
    let method: Method = args.method.parse()?;
    let flavor: GridFlavor = args.flavor.parse()?;
    let config = super::tool_config(args.config.as_deref(), args.tabula_jar)?;

    let input = args.input_file;
    if !is_pdf_path(&input) {
        return Err(TabliftError::InvalidInput(format!(
            "{} is not a PDF file",
            input.display()
        )));
    }

    let size = std::fs::metadata(&input)?.len();
    if size > config.max_input_bytes {
        return Err(TabliftError::InvalidInput(format!(
            "{} is {} bytes, above the limit of {} bytes",
            input.display(),
            size,
            config.max_input_bytes
        )));
    }
    debug!(input = %input.display(), size, "input accepted");

    let destination = args.out.unwrap_or_else(|| default_destination(&input));
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    debug!(destination = %destination.display(), %method, "converting");

    let toolkit = Toolkit::from_config(&config);
    let request = ConvertRequest::new(&input, &destination)
        .method(method)
        .pages(args.pages)
        .grid_flavor(flavor);
    let conversion = convert(&request, &toolkit)?;

    match args.output.as_str() {
        "json" => output::json::print(&conversion)?,
        _ => output::table::print_conversion(&conversion),
    }

    Ok(())
}
