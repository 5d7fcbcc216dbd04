use std::path::PathBuf;

use crate::statement::locate::find_export_files;
use crate::statement::merge::{
    aggregate, build_security_lookup, load_category_table,
    load_or_seed_offline, register_offline_securities, save_category_table,
};
use crate::statement::render::{render_categories, render_holdings};
use crate::statement::{
    parse_export_csv, ExportStatement, SchemaProfile, UNDEFINED_CATEGORY,
};
use crate::util::rw::{DescribedReader, WriteHandle};
use crate::{verboseln, write_errln};

use super::outfmt::model::{OutputType, SheetWriter};

pub type Error = String;

/// What to do when an export file cannot be parsed. Abort kills the whole
/// run on the first bad file; Skip trades that strictness for resilience
/// against stray csv files in the tree.
#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum MalformedPolicy {
    Abort,
    Skip,
}

impl std::fmt::Display for MalformedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = format!("{self:?}").to_lowercase();
        write!(f, "{s}")
    }
}

pub struct Options {
    pub source_dir: PathBuf,
    pub output_path: PathBuf,
    pub offline_path: PathBuf,
    pub categories_path: PathBuf,
    pub profile: SchemaProfile,
    pub on_malformed: MalformedPolicy,
}

/// What a run did, for the operator-facing summary.
#[derive(Debug)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub extracted_rows: usize,
    pub offline_rows: usize,
    pub new_securities: Vec<String>,
}

fn excluded_file_names(options: &Options) -> Vec<String> {
    [&options.offline_path, &options.output_path, &options.categories_path]
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect()
}

/// The whole pipeline: locate, extract, aggregate, merge offline rows,
/// maintain the category table, and hand the rendered tables to the sink.
pub fn run_pivot_app(
    options: &Options,
    mut sink: Box<dyn SheetWriter>,
    mut out: WriteHandle,
    mut err: WriteHandle,
) -> Result<RunSummary, Error> {
    let export_files =
        find_export_files(&options.source_dir, &excluded_file_names(options));

    let mut statements = Vec::<ExportStatement>::new();
    let mut files_skipped: usize = 0;
    for file in &export_files {
        write_errln!(out, "Processing {}", file.display());
        let reader = DescribedReader::from_file_path(file.clone());
        match parse_export_csv(&reader, &options.profile) {
            Ok(statement) => {
                verboseln!(
                    "  {} rows for account {} ({}) as of {}",
                    statement.records.len(),
                    statement.account,
                    statement.account_type,
                    statement.date
                );
                statements.push(statement);
            }
            Err(e) => match options.on_malformed {
                MalformedPolicy::Abort => return Err(e),
                MalformedPolicy::Skip => {
                    write_errln!(err, "Skipping {}: {}", file.display(), e);
                    files_skipped += 1;
                }
            },
        }
    }

    if export_files.is_empty() {
        write_errln!(
            out,
            "No export csv files found.\n\
             Put export csv files in {} or subfolders of it.",
            options.source_dir.display()
        );
    }

    let files_processed = statements.len();
    let records = aggregate(statements);
    let mut lookup = build_security_lookup(&records);

    let offline_rows = load_or_seed_offline(
        &options.offline_path,
        options.profile.output_header(),
    )?;
    register_offline_securities(
        &mut lookup,
        &offline_rows,
        options.profile.security_column(),
    );

    let mut categories = load_category_table(&options.categories_path)?;
    let new_securities = categories.merge_new(&lookup);
    if !new_securities.is_empty() || !options.categories_path.exists() {
        save_category_table(&options.categories_path, &categories)?;
    }
    if !new_securities.is_empty() {
        write_errln!(
            out,
            "{} new securities added to {} with category \"{}\":",
            new_securities.len(),
            options.categories_path.display(),
            UNDEFINED_CATEGORY
        );
        for security in &new_securities {
            write_errln!(out, "  {}", security);
        }
    }

    let holdings =
        render_holdings(&options.profile, &records, &offline_rows);
    sink.write_table(OutputType::Holdings, "Holdings", &holdings)?;
    sink.write_table(
        OutputType::Categories,
        "Categories",
        &render_categories(&categories),
    )?;
    sink.finish()?;

    Ok(RunSummary {
        files_processed,
        files_skipped,
        extracted_rows: records.len(),
        offline_rows: offline_rows.len(),
        new_securities,
    })
}
