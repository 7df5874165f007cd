//! Directory tree scanning
//!
//! This module builds trees of [`Node`]s from a directory. A scan runs in one
//! of two modes:
//!
//! - Sequential (`jobs == 1`): files and directories are transformed while the
//!   tree is read, so a directory transform can reduce it on the fly
//! - Parallel: a first pass records files, the file transform runs on a rayon
//!   pool, and the recorded tree is refolded with the results

mod config;
mod node;
mod parallel;
mod traversal;
mod walker;

// Re-export public types
pub use config::ScanConfig;
pub use node::{CyclicLinkedDir, DirNode, Entry, LinkedDir, Node, Tree};
pub use walker::{Scanner, scantree};
