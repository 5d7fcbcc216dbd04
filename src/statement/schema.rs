use super::csv_common::PvtCol;

/// Positions of the holding fields within one export data row, after the
/// trailing "% of Holdings" column has been dropped. Kept as an explicit
/// field-name -> index table so that a new export generation is a data
/// change, not a code change.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub symbol: usize,
    pub market: Option<usize>,
    pub security: usize,
    pub quantity: usize,
    pub price: usize,
    pub book_value: usize,
    pub market_value: usize,
    pub unrealized: usize,
    pub unrealized_pct: usize,
}

impl ColumnMap {
    /// Minimum number of data columns (excluding "% of Holdings") a row
    /// must have before any field access is attempted.
    pub fn min_columns(&self) -> usize {
        let indexes = [
            self.symbol,
            self.market.unwrap_or(0),
            self.security,
            self.quantity,
            self.price,
            self.book_value,
            self.market_value,
            self.unrealized,
            self.unrealized_pct,
        ];
        indexes.iter().max().map(|m| m + 1).unwrap_or(0)
    }
}

/// The positional layout of one export-file generation, plus the shape of
/// the consolidated table it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProfile {
    pub name: &'static str,
    pub columns: ColumnMap,
    /// Index of the account number among the space-separated tokens of the
    /// account header cell (eg. "TD Direct Investing - 538R77A").
    pub account_token_index: usize,
    header: Vec<&'static str>,
    security_out_col: usize,
    category_out_col: usize,
}

impl SchemaProfile {
    /// The current "webbroker" export layout. Rows carry a Market column,
    /// and an average-cost column (index 4) which is not carried over.
    pub fn webbroker() -> SchemaProfile {
        SchemaProfile {
            name: "webbroker",
            columns: ColumnMap {
                symbol: 0,
                market: Some(1),
                security: 2,
                quantity: 3,
                price: 5,
                book_value: 6,
                market_value: 7,
                unrealized: 8,
                unrealized_pct: 9,
            },
            account_token_index: 4,
            header: vec![
                PvtCol::DATE,
                PvtCol::ACCOUNT,
                PvtCol::ACCOUNT_TYPE,
                PvtCol::SYMBOL,
                PvtCol::MARKET,
                PvtCol::SECURITY,
                PvtCol::QUANTITY,
                PvtCol::PRICE,
                PvtCol::CATEGORY,
                PvtCol::BOOK_VALUE,
                PvtCol::MARKET_VALUE,
                PvtCol::UNREALIZED,
                PvtCol::GAIN_LOSS_PCT,
            ],
            security_out_col: 5,
            category_out_col: 8,
        }
    }

    /// The pre-webbroker layout: no Market column, so everything past the
    /// symbol sits one position lower.
    pub fn legacy() -> SchemaProfile {
        SchemaProfile {
            name: "legacy",
            columns: ColumnMap {
                symbol: 0,
                market: None,
                security: 1,
                quantity: 2,
                price: 4,
                book_value: 5,
                market_value: 6,
                unrealized: 7,
                unrealized_pct: 8,
            },
            account_token_index: 4,
            header: vec![
                PvtCol::DATE,
                PvtCol::ACCOUNT,
                PvtCol::SYMBOL,
                PvtCol::SECURITY,
                PvtCol::QUANTITY,
                PvtCol::PRICE,
                PvtCol::CATEGORY,
                PvtCol::BOOK_VALUE,
                PvtCol::MARKET_VALUE,
                PvtCol::UNREALIZED,
                PvtCol::GAIN_LOSS_PCT,
            ],
            security_out_col: 3,
            category_out_col: 6,
        }
    }

    pub fn output_header(&self) -> &[&'static str] {
        &self.header
    }

    /// Index of the Security (description) column in the output header.
    pub fn security_column(&self) -> usize {
        self.security_out_col
    }

    /// Index of the Category column in the output header.
    pub fn category_column(&self) -> usize {
        self.category_out_col
    }

    /// Index of the Date column in the output header.
    pub fn date_column(&self) -> usize {
        0
    }
}
