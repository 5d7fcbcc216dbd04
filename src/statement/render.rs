use time::Date;

use crate::statement::csv_common::PvtCol;
use crate::statement::model::{CategoryTable, HoldingRecord};
use crate::statement::schema::SchemaProfile;
use crate::util::date::parse_standard_date;

/// One output cell. `CategoryLookup` is a deferred-resolution marker: the
/// category is resolved against the category table at read time, so only a
/// formula-capable sink turns it into anything. The core stays
/// format-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Date(Date),
    Text(String),
    CategoryLookup,
}

/// A fully-rendered table: header first, then cell rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CellTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

fn record_to_cells(
    record: &HoldingRecord,
    profile: &SchemaProfile,
) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(profile.output_header().len());
    for col in profile.output_header() {
        let cell = match *col {
            PvtCol::DATE => Cell::Date(record.date),
            PvtCol::ACCOUNT => Cell::Text(record.account.clone()),
            PvtCol::ACCOUNT_TYPE => {
                Cell::Text(record.account_type.label().to_string())
            }
            PvtCol::SYMBOL => Cell::Text(record.symbol.clone()),
            PvtCol::MARKET => {
                Cell::Text(record.market.clone().unwrap_or_default())
            }
            PvtCol::SECURITY => Cell::Text(record.security.clone()),
            PvtCol::QUANTITY => Cell::Text(record.quantity.clone()),
            PvtCol::PRICE => Cell::Text(record.price.clone()),
            PvtCol::CATEGORY => Cell::CategoryLookup,
            PvtCol::BOOK_VALUE => Cell::Text(record.book_value.clone()),
            PvtCol::MARKET_VALUE => Cell::Text(record.market_value.clone()),
            PvtCol::UNREALIZED => Cell::Text(record.unrealized.clone()),
            PvtCol::GAIN_LOSS_PCT => {
                Cell::Text(record.unrealized_pct.clone())
            }
            _ => panic!("Invalid col {}", col),
        };
        cells.push(cell);
    }
    cells
}

/// Offline rows arrive in the output schema already. Their date column is
/// typed when it parses, and an empty category cell falls back to the same
/// deferred lookup as extracted rows (a filled-in one is kept verbatim).
fn offline_row_to_cells(
    row: &[String],
    profile: &SchemaProfile,
) -> Vec<Cell> {
    let n_cols = profile.output_header().len();
    let mut cells = Vec::with_capacity(n_cols);
    for i in 0..n_cols {
        let value = row.get(i).map(|s| s.as_str()).unwrap_or("");
        let cell = if i == profile.category_column() {
            if value.is_empty() {
                Cell::CategoryLookup
            } else {
                Cell::Text(value.to_string())
            }
        } else if i == profile.date_column() {
            match parse_standard_date(value) {
                Ok(date) => Cell::Date(date),
                Err(_) => Cell::Text(value.to_string()),
            }
        } else {
            Cell::Text(value.to_string())
        };
        cells.push(cell);
    }
    cells
}

/// Builds the consolidated table: header, every extracted record in
/// aggregation order, then the offline rows.
pub fn render_holdings(
    profile: &SchemaProfile,
    records: &[HoldingRecord],
    offline_rows: &[Vec<String>],
) -> CellTable {
    let header: Vec<String> =
        profile.output_header().iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::with_capacity(records.len() + offline_rows.len());
    for record in records {
        rows.push(record_to_cells(record, profile));
    }
    for row in offline_rows {
        rows.push(offline_row_to_cells(row, profile));
    }
    CellTable { header, rows }
}

/// Builds the category table in its persisted row order.
pub fn render_categories(table: &CategoryTable) -> CellTable {
    let header = vec![
        PvtCol::SECURITY.to_string(),
        PvtCol::CATEGORY.to_string(),
    ];
    let rows = table
        .rows()
        .iter()
        .map(|(security, category)| {
            vec![
                Cell::Text(security.clone()),
                Cell::Text(category.clone()),
            ]
        })
        .collect();
    CellTable { header, rows }
}
