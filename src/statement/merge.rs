use std::fs::File;
use std::path::Path;

use crate::statement::csv_common::category_table_header;
use crate::statement::extract::ExportStatement;
use crate::statement::model::{CategoryTable, HoldingRecord, SecurityLookup};
use crate::util::basic::SError;
use crate::util::os::{swap_into_place, temp_sibling};

/// Flattens per-file record lists into one sequence, preserving the order
/// in which the files were discovered and the row order within each file.
pub fn aggregate(statements: Vec<ExportStatement>) -> Vec<HoldingRecord> {
    let mut records = Vec::<HoldingRecord>::new();
    for mut statement in statements {
        records.append(&mut statement.records);
    }
    records
}

/// Folds every extracted record into the description -> symbol lookup,
/// in aggregation order (so the last row for a description wins).
pub fn build_security_lookup(records: &[HoldingRecord]) -> SecurityLookup {
    let mut lookup = SecurityLookup::new();
    for record in records {
        lookup.register(&record.security, &record.symbol);
    }
    lookup
}

/// Reads the operator-maintained offline table, returning its data rows
/// (its header is not part of the merge). If the file does not exist it is
/// seeded with the given header and nothing else; the pipeline never
/// overwrites it after that.
pub fn load_or_seed_offline(
    path: &Path,
    header: &[&str],
) -> Result<Vec<Vec<String>>, SError> {
    if !path.exists() {
        let fp = File::create(path).map_err(|e| {
            format!("Failed to create {}: {}", path.display(), e)
        })?;
        let mut csv_w =
            csv::WriterBuilder::new().has_headers(false).from_writer(fp);
        csv_w.write_record(header).map_err(|e| e.to_string())?;
        csv_w.flush().map_err(|e| e.to_string())?;
        return Ok(Vec::new());
    }

    let mut csv_r = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;

    let mut rows = Vec::<Vec<String>>::new();
    for (i, record_res) in csv_r.records().enumerate() {
        let record = record_res.map_err(|e| {
            format!("Error in {} row {}: {}", path.display(), i + 1, e)
        })?;
        if i == 0 {
            // The offline table's own header row.
            continue;
        }
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(rows)
}

/// Offline rows have no separate symbol, so each description maps to
/// itself in the lookup.
pub fn register_offline_securities(
    lookup: &mut SecurityLookup,
    offline_rows: &[Vec<String>],
    security_col: usize,
) {
    for row in offline_rows {
        if let Some(description) = row.get(security_col) {
            lookup.register(description, description);
        }
    }
}

/// Loads the persisted category table; a missing file is an empty table,
/// not an error (first run).
pub fn load_category_table(path: &Path) -> Result<CategoryTable, SError> {
    let mut table = CategoryTable::new();
    if !path.exists() {
        return Ok(table);
    }

    let mut csv_r = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    for (i, record_res) in csv_r.records().enumerate() {
        let record = record_res.map_err(|e| {
            format!("Error in {} row {}: {}", path.display(), i + 2, e)
        })?;
        let security = record.get(0).unwrap_or("").to_string();
        if security.is_empty() {
            continue;
        }
        let category = record.get(1).unwrap_or("").to_string();
        if !table.insert(security.clone(), category) {
            // A skipped duplicate disappears on the next save.
            tracing::warn!(
                "{} row {}: duplicate security \"{}\"; keeping the first \
                 category",
                path.display(),
                i + 2,
                security
            );
        }
    }
    Ok(table)
}

/// Rewrites the category table in row order, via a temp file so a failed
/// write cannot clobber the operator's assignments.
pub fn save_category_table(
    path: &Path,
    table: &CategoryTable,
) -> Result<(), SError> {
    let tmp = temp_sibling(path);
    let fp = File::create(&tmp)
        .map_err(|e| format!("Failed to create {}: {}", tmp.display(), e))?;
    let mut csv_w =
        csv::WriterBuilder::new().has_headers(false).from_writer(fp);
    csv_w
        .write_record(category_table_header())
        .map_err(|e| e.to_string())?;
    for (security, category) in table.rows() {
        csv_w
            .write_record([security.as_str(), category.as_str()])
            .map_err(|e| e.to_string())?;
    }
    csv_w.flush().map_err(|e| e.to_string())?;
    drop(csv_w);
    swap_into_place(&tmp, path)
}
