use std::fs::File;
use std::path::{Path, PathBuf};

use crate::statement::render::{Cell, CellTable};
use crate::util::os::{swap_into_place, temp_sibling};

use super::model::{Error, OutputType, SheetWriter};

/// Flat-table sink. Category lookup cells are rendered empty: a plain csv
/// has no formulas, so category resolution is left to whatever loads it.
/// The category table itself is already persisted as its own csv, so the
/// Categories output is a no-op here.
pub struct CsvWriter {
    out_path: PathBuf,
}

impl CsvWriter {
    pub fn new(out_path: &Path) -> CsvWriter {
        CsvWriter { out_path: out_path.to_path_buf() }
    }
}

fn cell_to_string(cell: &Cell) -> String {
    match cell {
        Cell::Date(date) => date.to_string(),
        Cell::Text(text) => text.clone(),
        Cell::CategoryLookup => String::new(),
    }
}

impl SheetWriter for CsvWriter {
    fn write_table(
        &mut self,
        out_type: OutputType,
        name: &str,
        table: &CellTable,
    ) -> Result<(), Error> {
        match out_type {
            OutputType::Holdings => (),
            OutputType::Categories => {
                tracing::debug!(
                    "csv sink: {} table already persisted separately", name
                );
                return Ok(());
            }
        }

        // The destination is recreated from scratch each run. Write to a
        // sibling temp file and swap, so a failed run cannot leave a
        // truncated table in place.
        let tmp = temp_sibling(&self.out_path);
        let fp = File::create(&tmp).map_err(|e| {
            format!("Failed to create {}: {}", tmp.display(), e)
        })?;

        let mut csv_w =
            csv::WriterBuilder::new().has_headers(false).from_writer(fp);
        csv_w.write_record(&table.header).map_err(|e| e.to_string())?;
        for row in &table.rows {
            let record: Vec<String> = row.iter().map(cell_to_string).collect();
            csv_w.write_record(&record).map_err(|e| e.to_string())?;
        }
        csv_w.flush().map_err(|e| e.to_string())?;
        drop(csv_w);

        swap_into_place(&tmp, &self.out_path)
    }
}
