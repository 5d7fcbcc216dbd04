use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use itertools::Itertools;
use rust_decimal::Decimal;
use time::Date;

pub const UNDEFINED_CATEGORY: &str = "undefined";

/// Account classification inferred from the last character of the account
/// number (538R77A -> Cash, 538R77S -> SDRSP, 538R77J -> TFSA).
///
/// This is a closed 3-way classification inherited from the export naming
/// convention. It is a known design smell; the convention is not under our
/// control, so there is nothing to generalize here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Cash,
    Sdrsp,
    Tfsa,
}

impl AccountType {
    pub fn from_account_id(account_id: &str) -> AccountType {
        match account_id.chars().next_back() {
            Some('S') => AccountType::Sdrsp,
            Some('J') => AccountType::Tfsa,
            _ => AccountType::Cash,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Cash => "Cash",
            AccountType::Sdrsp => "SDRSP",
            AccountType::Tfsa => "TFSA",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One security position within one account on one statement date.
///
/// The quantity/price/value fields are kept as the opaque strings found in
/// the export. The upstream contract is that they are either valid decimal
/// numbers or empty; cell typing happens at the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingRecord {
    pub date: Date,
    pub account: String,
    pub account_type: AccountType,
    pub symbol: String,
    pub market: Option<String>,
    pub security: String,
    pub quantity: String,
    pub price: String,
    pub book_value: String,
    pub market_value: String,
    pub unrealized: String,
    pub unrealized_pct: String,
}

/// True if the value honors the numeric-or-empty contract of the export's
/// value columns. A violation usually means the active schema profile does
/// not match the file.
pub fn is_numeric_or_empty(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || Decimal::from_str(trimmed).is_ok()
}

/// Description -> symbol map of every distinct security seen.
///
/// Descriptions, not symbols, are the canonical key: symbols collide across
/// markets, descriptions rarely do. Registering the same description twice
/// overwrites the symbol (last write wins).
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityLookup {
    map: HashMap<String, String>,
}

impl SecurityLookup {
    pub fn new() -> SecurityLookup {
        SecurityLookup { map: HashMap::new() }
    }

    pub fn register(&mut self, description: &str, symbol: &str) {
        if description.is_empty() {
            return;
        }
        self.map.insert(description.to_string(), symbol.to_string());
    }

    pub fn symbol_for(&self, description: &str) -> Option<&str> {
        self.map.get(description).map(|s| s.as_str())
    }

    pub fn securities(&self) -> impl Iterator<Item = &String> {
        self.map.keys()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Persisted description -> category rows, maintained additively.
/// Rows are never removed or reordered, and existing category assignments
/// are never touched. New securities get the "undefined" sentinel for the
/// operator to fill in.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    rows: Vec<(String, String)>,
    known: HashSet<String>,
}

impl CategoryTable {
    pub fn new() -> CategoryTable {
        CategoryTable { rows: Vec::new(), known: HashSet::new() }
    }

    /// Appends a row, keeping the first category seen for a description.
    /// Returns false if the description was already present.
    pub fn insert(&mut self, security: String, category: String) -> bool {
        if self.known.contains(&security) {
            return false;
        }
        self.known.insert(security.clone());
        self.rows.push((security, category));
        true
    }

    /// Appends one "undefined" row per description in `lookup` that is not
    /// already present. Returns the added descriptions, sorted.
    pub fn merge_new(&mut self, lookup: &SecurityLookup) -> Vec<String> {
        let new_securities: Vec<String> = lookup
            .securities()
            .filter(|s| !self.known.contains(*s))
            .cloned()
            .sorted()
            .collect();
        for sec in &new_securities {
            self.insert(sec.clone(), UNDEFINED_CATEGORY.to_string());
        }
        new_securities
    }

    pub fn category_of(&self, security: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(sec, _)| sec == security)
            .map(|(_, cat)| cat.as_str())
    }

    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
