use std::io::BufRead;
use std::path::PathBuf;

use clap::Parser;

use crate::app::approot::{
    run_pivot_app, MalformedPolicy, Options, RunSummary,
};
use crate::app::outfmt::csv::CsvWriter;
use crate::app::outfmt::model::SheetWriter;
use crate::statement::csv_common::PvtCol;
use crate::statement::SchemaProfile;
use crate::util::basic::SError;
use crate::util::rw::WriteHandle;

const ABOUT: &str =
    "Consolidates brokerage csv account statements for pivot-table analysis";

fn get_long_about() -> String {
    format!(
        "\
Walks a directory tree for csv statement exports, extracts the statement
date, account and security holdings from each, merges in manually-entered
rows from an offline csv, and writes one consolidated table suitable for
loading into a spreadsheet data model.

Every security seen is also tracked in a category csv, where new entries
appear with the category \"{}\" for you to classify (eg. Canadian equity,
fixed income). The consolidated output resolves the {} column from that
table at read time when the output format supports formulas.",
        crate::statement::UNDEFINED_CATEGORY,
        PvtCol::CATEGORY
    )
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum ProfileArg {
    Webbroker,
    Legacy,
}

impl ProfileArg {
    pub fn profile(&self) -> SchemaProfile {
        match self {
            ProfileArg::Webbroker => SchemaProfile::webbroker(),
            ProfileArg::Legacy => SchemaProfile::legacy(),
        }
    }
}

impl std::fmt::Display for ProfileArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = format!("{self:?}").to_lowercase();
        write!(f, "{s}")
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum SinkArg {
    Csv,
    #[cfg(feature = "xlsx_write")]
    Xlsx,
}

impl std::fmt::Display for SinkArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = format!("{self:?}").to_lowercase();
        write!(f, "{s}")
    }
}

#[derive(Parser, Debug)]
#[command(version = crate::app::APP_VERSION,
          about = ABOUT, long_about = get_long_about())]
pub struct Args {
    /// Directory to scan recursively for exported statement csv files
    #[arg(default_value = ".")]
    pub source_dir: PathBuf,

    /// Output format for the consolidated table
    #[arg(short = 'f', long, value_enum, default_value_t = SinkArg::Csv,
          ignore_case = true)]
    pub output_format: SinkArg,

    /// Consolidated output file. Defaults to consolidated.csv or
    /// consolidated.xlsx, per --output-format
    #[arg(short = 'o', long)]
    pub output_file: Option<PathBuf>,

    /// Csv for manually-entered holdings; created with just a header on
    /// the first run, and never modified afterwards
    #[arg(long, default_value = "offline.csv")]
    pub offline_file: PathBuf,

    /// Csv tracking the category assigned to each security
    #[arg(long, default_value = "categories.csv")]
    pub categories_file: PathBuf,

    /// Column layout of the export files
    #[arg(long, value_enum, default_value_t = ProfileArg::Webbroker,
          ignore_case = true)]
    pub schema: ProfileArg,

    /// What to do when a csv file cannot be parsed as a statement export
    #[arg(long, value_enum, default_value_t = MalformedPolicy::Abort,
          ignore_case = true)]
    pub on_malformed: MalformedPolicy,

    /// Print verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Do not wait for Enter before exiting
    #[arg(long, default_value_t = false)]
    pub no_pause: bool,
}

fn default_output_file(format: SinkArg) -> PathBuf {
    match format {
        SinkArg::Csv => PathBuf::from("consolidated.csv"),
        #[cfg(feature = "xlsx_write")]
        SinkArg::Xlsx => PathBuf::from("consolidated.xlsx"),
    }
}

fn run_with_args(args: &Args) -> Result<RunSummary, SError> {
    let output_path = args
        .output_file
        .clone()
        .unwrap_or_else(|| default_output_file(args.output_format));

    let sink: Box<dyn SheetWriter> = match args.output_format {
        SinkArg::Csv => Box::new(CsvWriter::new(&output_path)),
        #[cfg(feature = "xlsx_write")]
        SinkArg::Xlsx => {
            Box::new(crate::app::outfmt::xlsx::XlsxWriter::new(&output_path))
        }
    };

    let options = Options {
        source_dir: args.source_dir.clone(),
        output_path,
        offline_path: args.offline_file.clone(),
        categories_path: args.categories_file.clone(),
        profile: args.schema.profile(),
        on_malformed: args.on_malformed,
    };

    run_pivot_app(
        &options,
        sink,
        WriteHandle::stdout_write_handle(),
        WriteHandle::stderr_write_handle(),
    )
}

fn pause_for_enter() {
    println!("Press Enter to Continue");
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}

pub fn command_main() {
    crate::tracing::setup_tracing();
    let args = Args::parse();
    crate::log::set_verbose(args.verbose);

    let exit_code = match run_with_args(&args) {
        Ok(summary) => {
            println!(
                "Wrote {} holding rows ({} extracted from {} files, \
                 {} offline)",
                summary.extracted_rows + summary.offline_rows,
                summary.extracted_rows,
                summary.files_processed,
                summary.offline_rows
            );
            if summary.files_skipped > 0 {
                println!("Skipped {} unparsable files", summary.files_skipped);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    if !args.no_pause {
        pause_for_enter();
    }
    std::process::exit(exit_code);
}
