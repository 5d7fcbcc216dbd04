pub use time::Date;
use time::{macros::format_description, UtcOffset};

pub type StaticDateFormat<'a> =
    &'static [time::format_description::BorrowedFormatItem<'a>];

pub const STANDARD_DATE_FORMAT: StaticDateFormat =
    format_description!("[year]-[month]-[day]");

pub fn parse_standard_date(date_str: &str) -> Result<Date, time::error::Parse> {
    Date::parse(date_str, STANDARD_DATE_FORMAT)
}

// This is a (possibly unsafe, but workable) way to get the current system
// UtcOffset of the local timezone.
// Using UtcOffset::current_local_offset is apparently unsafe on Linux,
// and will return an error if used without enabling some "unsafe" feature,
// so go through chrono instead.
pub fn local_utc_offset() -> Result<UtcOffset, time::error::ComponentRange> {
    let now = chrono::offset::Local::now();
    let offset = now.offset();
    UtcOffset::from_whole_seconds(-1 * offset.utc_minus_local())
}
