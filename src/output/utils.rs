//! Shared utility functions for output formatting

use crate::path::ScanPath;

/// Calculate the prefix for the children of an entry.
pub fn child_prefix(prefix: &str, is_last: bool) -> String {
    if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    }
}

/// Relative path of an entry for flat listings. Anything that is not a
/// file gets a trailing `/.` so directories stand out.
pub fn path_label(path: &ScanPath) -> String {
    let relative = path.relative_str();
    if path.is_file() {
        relative
    } else if relative.is_empty() {
        ".".to_string()
    } else {
        format!("{}/.", relative)
    }
}

/// Format a list of paths, one per line.
pub fn format_paths(paths: &[ScanPath]) -> String {
    let mut output = String::new();
    for path in paths {
        output.push_str(&path_label(path));
        output.push('\n');
    }
    output
}
