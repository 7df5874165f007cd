//! Scantree - recursive, symlink-aware directory scanning
//!
//! Builds an in-memory tree of a directory, or folds one on the fly, while
//! detecting symlinks that loop back into the branch being scanned.
//!
//! ```no_run
//! use scantree::{ScanConfig, Scanner};
//!
//! let tree = scantree::scantree(".")?;
//! for path in tree.filepaths() {
//!     println!("{}", path.relative().display());
//! }
//!
//! // Total size of all files, computed on four workers.
//! let config = ScanConfig { jobs: 4, ..ScanConfig::default() };
//! let total: u64 = Scanner::new(config).scan_with(
//!     ".",
//!     |path| path.stat().map(|m| m.len()).unwrap_or(0),
//!     |node: scantree::Node<u64, u64>| {
//!         node.as_dir()
//!             .map(|dir| dir.files.iter().sum::<u64>() + dir.directories.iter().sum::<u64>())
//!             .unwrap_or(0)
//!     },
//! )?;
//! println!("{total} bytes");
//! # Ok::<(), scantree::ScanError>(())
//! ```

pub mod error;
pub mod filter;
pub mod output;
pub mod path;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{ErrorKind, ScanError};
pub use filter::{AcceptAll, EntryFilter, RecursionFilter};
pub use output::{OutputConfig, TreeFormatter, format_paths, print_json};
pub use path::ScanPath;
pub use tree::{
    CyclicLinkedDir, DirNode, Entry, LinkedDir, Node, ScanConfig, Scanner, Tree, scantree,
};
