pub mod csv;
pub mod model;

#[cfg(feature = "xlsx_write")]
pub mod xlsx;
