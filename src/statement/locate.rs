use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use walkdir::WalkDir;

lazy_static! {
    // Export files are named after the account: digits, a letter, more
    // digits, then the account-type letter, eg. 538R77A-30-Jun-2015.csv.
    // This is a documentary hint only; every csv is still attempted.
    static ref EXPORT_NAME_HINT_RE: Regex =
        Regex::new(r"^\d+\w\d+[ASJB]").unwrap();
}

/// Recursively collects candidate export files under `root`: every file
/// with a .csv extension whose name is not one of `excluded_names` (the
/// offline-entry, category and output tables live in the same tree).
///
/// Order is filesystem-walk order, which is not stable across platforms.
/// Unreadable directory entries are logged and skipped, as the walk of a
/// working tree should not die on a permission oddity.
pub fn find_export_files(root: &Path, excluded_names: &[String]) -> Vec<PathBuf> {
    let mut found = Vec::<PathBuf>::new();
    for entry_res in WalkDir::new(root) {
        let entry = match entry_res {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}",
                               root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !file_name.ends_with(".csv") {
            continue;
        }
        if excluded_names.iter().any(|n| *n == file_name) {
            continue;
        }
        if !EXPORT_NAME_HINT_RE.is_match(&file_name) {
            tracing::debug!(
                "{} does not match the usual export naming pattern",
                file_name
            );
        }
        found.push(entry.into_path());
    }
    found
}
