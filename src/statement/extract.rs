use std::io::Read;

use time::Date;

use crate::statement::model::{
    is_numeric_or_empty, AccountType, HoldingRecord,
};
use crate::statement::schema::SchemaProfile;
use crate::util::basic::SError;
use crate::util::date::parse_standard_date;
use crate::util::rw::DescribedReader;

/// Rows preceding the security data in every export file: the date row,
/// the account row, the summary metrics, and the column-header row.
pub const LEADING_ROWS: usize = 8;

/// A valid export file has the leading rows plus at least one security row.
pub const MIN_EXPORT_ROWS: usize = LEADING_ROWS + 1;

/// Everything extracted from one export file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStatement {
    pub date: Date,
    pub account: String,
    pub account_type: AccountType,
    pub records: Vec<HoldingRecord>,
}

// The export structure is fixed by the brokerage:
//   row 0: As of Date,2016-10-21 11:17:48
//   row 1: Account,TD Direct Investing - 538R77A
//   rows 2-6: summary metrics (ignored)
//   row 7: blank, or the security column headers
//   rows 8+: one security per row, positions per the schema profile,
//            always ending in a "% of Holdings" column
//
// The csv reader silently drops blank lines, so records are picked out by
// the line each one starts on (its Position) rather than by record count;
// a blank line in the header block would otherwise shift every fixed
// offset. Keying on start lines also keeps quoted fields with embedded
// newlines intact.

fn parse_statement_date(
    date_row: &[String],
    desc: &str,
) -> Result<Date, SError> {
    let date_cell = date_row
        .get(1)
        .ok_or(format!("{desc}: no date cell in the first row"))?;
    let date_token = date_cell
        .split_whitespace()
        .next()
        .ok_or(format!("{desc}: date cell is empty"))?;
    parse_standard_date(date_token).map_err(|e| {
        format!("{desc}: invalid statement date \"{date_token}\": {e}")
    })
}

fn parse_account_id(
    account_row: &[String],
    profile: &SchemaProfile,
    desc: &str,
) -> Result<String, SError> {
    let account_cell = account_row
        .get(1)
        .ok_or(format!("{desc}: no account cell in the second row"))?;
    // Split on single spaces. The account number's token position is part
    // of the schema profile (eg. "TD Direct Investing - 538R77A" -> 4).
    let tokens: Vec<&str> = account_cell.split(' ').collect();
    let account = tokens
        .get(profile.account_token_index)
        .map(|t| t.to_string())
        .unwrap_or_default();
    if account.is_empty() {
        return Err(format!(
            "{desc}: cannot locate account number in \"{account_cell}\""
        ));
    }
    Ok(account)
}

fn record_from_row(
    mut cells: Vec<String>,
    date: Date,
    account: &str,
    account_type: AccountType,
    profile: &SchemaProfile,
    desc: &str,
    row_num: usize,
) -> Result<HoldingRecord, SError> {
    let cols = &profile.columns;

    // The trailing "% of Holdings" column is not carried over.
    let min_with_pct = cols.min_columns() + 1;
    if cells.len() < min_with_pct {
        return Err(format!(
            "{desc} row {row_num}: expected at least {min_with_pct} columns \
             for the {} layout, found {}",
            profile.name,
            cells.len()
        ));
    }
    cells.pop();

    let field = |idx: usize| cells[idx].clone();

    let record = HoldingRecord {
        date,
        account: account.to_string(),
        account_type,
        symbol: field(cols.symbol),
        market: cols.market.map(&field),
        security: field(cols.security),
        quantity: field(cols.quantity),
        price: field(cols.price),
        book_value: field(cols.book_value),
        market_value: field(cols.market_value),
        unrealized: field(cols.unrealized),
        unrealized_pct: field(cols.unrealized_pct),
    };

    for value in [
        &record.quantity,
        &record.price,
        &record.book_value,
        &record.market_value,
        &record.unrealized,
        &record.unrealized_pct,
    ] {
        if !is_numeric_or_empty(value) {
            tracing::warn!(
                "{desc} row {row_num}: non-numeric value \"{value}\" in a \
                 value column; the {} layout may not match this file",
                profile.name
            );
        }
    }

    Ok(record)
}

/// Parses one export file into its statement date, account, and holdings.
///
/// Fails fast on anything malformed (too few rows, unparsable date or
/// account header, rows shorter than the active profile allows). The
/// caller's malformed-file policy decides whether that aborts the run.
pub fn parse_export_csv(
    desc_reader: &DescribedReader,
    profile: &SchemaProfile,
) -> Result<ExportStatement, SError> {
    let desc = desc_reader.desc();

    let mut reader = desc_reader
        .reader()
        .map_err(|e| format!("Failed to open {desc}: {e}"))?;
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| format!("Failed to read {desc}: {e}"))?;

    let n_lines = content.lines().count();
    if n_lines < MIN_EXPORT_ROWS {
        return Err(format!(
            "{desc}: {n_lines} rows; an export file has at least \
             {MIN_EXPORT_ROWS} (is this an export file?)"
        ));
    }

    let mut csv_r = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut date_row = Vec::<String>::new();
    let mut account_row = Vec::<String>::new();
    let mut data_rows = Vec::<(usize, Vec<String>)>::new();
    for record_res in csv_r.records() {
        let record =
            record_res.map_err(|e| format!("Error reading {desc}: {e}"))?;
        let row_num =
            record.position().map(|p| p.line() as usize).unwrap_or(0);
        let cells: Vec<String> =
            record.iter().map(|s| s.to_string()).collect();
        match row_num {
            1 => date_row = cells,
            2 => account_row = cells,
            n if n > LEADING_ROWS => data_rows.push((n, cells)),
            _ => (),
        }
    }

    let date = parse_statement_date(&date_row, desc)?;
    let account = parse_account_id(&account_row, profile, desc)?;
    let account_type = AccountType::from_account_id(&account);

    let mut records = Vec::<HoldingRecord>::new();
    for (row_num, cells) in data_rows {
        records.push(record_from_row(
            cells, date, &account, account_type, profile, desc, row_num,
        )?);
    }

    Ok(ExportStatement { date, account, account_type, records })
}
