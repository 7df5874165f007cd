//! Tree formatting and display
//!
//! This module provides formatters for outputting scanned trees:
//! - Console output with colors, or plain text
//! - JSON output
//! - Flat path listings (leaves or files only)
//!
//! # Module Structure
//!
//! - `config` - Output configuration types
//! - `utils` - Shared utility functions (prefix calculation, path labels)
//! - `tree` - Tree drawing formatter
//! - `json` - JSON output

mod config;
mod json;
mod tree;
mod utils;

// Re-export public types and functions
pub use config::OutputConfig;
pub use json::{print_json, to_json};
pub use tree::TreeFormatter;
pub use utils::{child_prefix, format_paths, path_label};
