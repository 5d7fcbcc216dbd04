pub mod approot;
pub mod outfmt;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
