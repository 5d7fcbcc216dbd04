pub mod csv_common;
pub mod extract;
pub mod locate;
pub mod merge;
pub mod model;
pub mod render;
pub mod schema;

pub use extract::{parse_export_csv, ExportStatement};
pub use model::{
    AccountType, CategoryTable, HoldingRecord, SecurityLookup,
    UNDEFINED_CATEGORY,
};
pub use schema::SchemaProfile;
