//! Test utilities for building directory fixtures.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::path::ScanPath;
use crate::tree::{Node, Tree};

/// A temporary directory for testing.
///
/// Provides methods for creating files, directories and symlinks, and for
/// building the `ScanPath` a scan of this directory would produce.
/// The directory is automatically cleaned up when dropped.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Add a directory and its parents.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Add a symlink at `path` pointing to `target`, both relative to the
    /// temporary directory. The link stores the absolute target path.
    #[cfg(unix)]
    pub fn add_symlink(&self, path: &str, target: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        let target = if target.is_empty() {
            self.dir.path().to_path_buf()
        } else {
            self.dir.path().join(target)
        };
        std::os::unix::fs::symlink(&target, &full_path).expect("Failed to create symlink");
        full_path
    }

    /// The `ScanPath` of `relative` in a scan rooted at this directory.
    pub fn scan_path(&self, relative: &str) -> ScanPath {
        scan_path_at(self.path(), relative)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the `ScanPath` of `relative` in a scan rooted at `root`, the way a
/// replay of a scan would: from the entry's own path, not from its parent.
pub fn scan_path_at(root: impl AsRef<Path>, relative: &str) -> ScanPath {
    let root = root.as_ref();
    if relative.is_empty() {
        return ScanPath::from_root(root).expect("Failed to resolve scan root");
    }
    ScanPath::from_root(root.join(relative))
        .expect("Failed to resolve path")
        .rebased(root, relative)
}

/// Assert that two paths agree on every property, queried twice to
/// exercise the metadata cache.
pub fn assert_scan_path_eq(left: &ScanPath, right: &ScanPath) {
    assert_eq!(left.root(), right.root());
    assert_eq!(left.relative(), right.relative());
    assert_eq!(left.real(), right.real());
    assert_eq!(left.absolute(), right.absolute());
    for attempt in 1..=2 {
        assert_eq!(left, right, "paths differ (attempt {attempt})");
    }
}

/// Assert that two trees have the same shape and paths.
///
/// Children are compared pairwise. Like the scan result itself, the
/// comparison is order sensitive.
pub fn assert_tree_eq(left: &Tree, right: &Tree) {
    assert_scan_path_eq(left.path(), right.path());
    match (&left.0, &right.0) {
        (Node::Linked(_), Node::Linked(_)) => {}
        (Node::Cyclic(l), Node::Cyclic(r)) => {
            assert_scan_path_eq(&l.target_path, &r.target_path);
        }
        (Node::Dir(l), Node::Dir(r)) => {
            assert_eq!(
                l.files.len(),
                r.files.len(),
                "file count differs in {:?}",
                l.path.relative()
            );
            for (lf, rf) in l.files.iter().zip(&r.files) {
                assert_scan_path_eq(lf, rf);
            }
            assert_eq!(
                l.directories.len(),
                r.directories.len(),
                "directory count differs in {:?}",
                l.path.relative()
            );
            for (ld, rd) in l.directories.iter().zip(&r.directories) {
                assert_tree_eq(ld, rd);
            }
        }
        (l, r) => panic!("node kinds differ: {l:?} vs {r:?}"),
    }
}
