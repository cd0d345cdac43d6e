mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tablift",
    version,
    about = "Convert tables in PDF documents into xlsx workbooks"
)]
struct Cli {
    /// Log every extraction step to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF into a workbook with one sheet per table
    Convert(commands::convert::ConvertArgs),
    /// Show which extraction strategies are available
    Capabilities {
        /// JSON tool configuration file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Tabula jar (overrides the configuration file)
        #[arg(long, value_name = "JAR")]
        tabula_jar: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(long, default_value = "table")]
        output: String,
    },
    /// Show how a page selector is interpreted
    Pages {
        /// Page selector, e.g. "all", "2-5" or "1,3"
        selector: String,

        /// Resolve against a document with this many pages
        #[arg(long, value_name = "N")]
        page_count: Option<usize>,

        /// Output format: table (default) or json
        #[arg(long, default_value = "table")]
        output: String,
    },
    /// List the sheets and rows of a workbook
    Inspect {
        /// Path to an xlsx file
        workbook: PathBuf,

        /// Output format: table (default) or json
        #[arg(long, default_value = "table")]
        output: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Capabilities {
            config,
            tabula_jar,
            output,
        } => commands::capabilities::run(config, tabula_jar, &output),
        Commands::Pages {
            selector,
            page_count,
            output,
        } => commands::pages::run(&selector, page_count, &output),
        Commands::Inspect { workbook, output } => commands::inspect::run(&workbook, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
