//! JSON output formatting

use std::io;

use crate::tree::Tree;

/// Serialize a tree as pretty-printed JSON.
pub fn to_json(tree: &Tree) -> io::Result<String> {
    serde_json::to_string_pretty(tree).map_err(io::Error::other)
}

/// Print tree as pretty-printed JSON to stdout.
pub fn print_json(tree: &Tree) -> io::Result<()> {
    println!("{}", to_json(tree)?);
    Ok(())
}
