//! Path helpers for the data directory.

use std::path::PathBuf;

/// Joins `dir_path` and `subdir_path` with the platform separator.
///
/// Non UTF-8 components are replaced lossily.
///
/// ```ignore
/// let path = get_path("/var/lib/patchnotes", "session");
/// assert_eq!(path, "/var/lib/patchnotes/session");
/// ```
pub fn get_path(dir_path: &str, subdir_path: &str) -> String {
    let path_buf: PathBuf = [dir_path, subdir_path].iter().collect();
    path_buf.to_string_lossy().into_owned()
}
