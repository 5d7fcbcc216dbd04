use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use super::basic::SError;

/// Path of a scratch file next to `dest`, so the final rename never
/// crosses a filesystem boundary.
pub fn temp_sibling(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("out"));
    name.push(".tmp");
    dest.with_file_name(name)
}

/// Atomically replace `dest` with the fully-written `tmp` file.
/// On failure the scratch file is removed, and `dest` is left as it was.
pub fn swap_into_place(tmp: &Path, dest: &Path) -> Result<(), SError> {
    fs::rename(tmp, dest).map_err(|e| {
        let _ = fs::remove_file(tmp);
        format!("Failed to replace {}: {}", dest.display(), e)
    })
}
