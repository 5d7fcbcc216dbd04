/// Column names of the consolidated output table (and of the offline-entry
/// csv, which shares the same logical header).
pub struct PvtCol();
impl PvtCol {
    pub const DATE: &'static str = "Date";
    pub const ACCOUNT: &'static str = "Account";
    pub const ACCOUNT_TYPE: &'static str = "Account Type";
    pub const SYMBOL: &'static str = "Symbol";
    pub const MARKET: &'static str = "Market";
    pub const SECURITY: &'static str = "Security";
    pub const QUANTITY: &'static str = "Quantity";
    pub const PRICE: &'static str = "Price";
    pub const CATEGORY: &'static str = "Category";
    pub const BOOK_VALUE: &'static str = "Book Value";
    pub const MARKET_VALUE: &'static str = "Market Value";
    pub const UNREALIZED: &'static str = "Unrealized $";
    pub const GAIN_LOSS_PCT: &'static str = "Gain/Loss %";
}

/// Header of the persisted category table.
pub fn category_table_header() -> [&'static str; 2] {
    [PvtCol::SECURITY, PvtCol::CATEGORY]
}
