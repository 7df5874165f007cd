//! Entry filtering for tree scanning

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::ScanError;
use crate::path::ScanPath;

/// Decides which directory entries take part in a scan.
///
/// The scanner hands every directory listing to [`EntryFilter::apply`]
/// before sorting and recursing.
pub trait EntryFilter: Send + Sync {
    /// Check if a single entry should be included.
    fn include(&self, path: &ScanPath) -> bool;

    /// Keep only the included entries, preserving their order.
    fn apply(&self, paths: Vec<ScanPath>) -> Vec<ScanPath> {
        paths.into_iter().filter(|path| self.include(path)).collect()
    }
}

/// Filter that includes everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl EntryFilter for AcceptAll {
    fn include(&self, _path: &ScanPath) -> bool {
        true
    }

    fn apply(&self, paths: Vec<ScanPath>) -> Vec<ScanPath> {
        paths
    }
}

impl<F> EntryFilter for F
where
    F: Fn(&ScanPath) -> bool + Send + Sync,
{
    fn include(&self, path: &ScanPath) -> bool {
        self(path)
    }
}

/// Filter on link status and gitignore-style match patterns.
///
/// Patterns select the files to *include*: a file is kept when the last
/// pattern matching its relative path is not negated with `!`.
/// Directories are never excluded by patterns, only by `linked_dirs`.
#[derive(Debug, Clone)]
pub struct RecursionFilter {
    linked_dirs: bool,
    linked_files: bool,
    patterns: Vec<String>,
    matcher: Option<Gitignore>,
}

impl Default for RecursionFilter {
    fn default() -> Self {
        Self {
            linked_dirs: true,
            linked_files: true,
            patterns: vec!["*".to_string()],
            matcher: None,
        }
    }
}

impl RecursionFilter {
    /// Create a filter that includes every entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include files matching `patterns` only.
    pub fn with_patterns<I, S>(patterns: I) -> Result<Self, ScanError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().match_patterns(patterns)
    }

    /// Replace the match patterns.
    pub fn match_patterns<I, S>(mut self, patterns: I) -> Result<Self, ScanError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        self.matcher = if patterns == ["*"] {
            None
        } else {
            let mut builder = GitignoreBuilder::new(".");
            for pattern in &patterns {
                builder.add_line(None, pattern)?;
            }
            Some(builder.build()?)
        };
        self.patterns = patterns;
        Ok(self)
    }

    /// Whether to include symlinks to directories.
    pub fn linked_dirs(mut self, include: bool) -> Self {
        self.linked_dirs = include;
        self
    }

    /// Whether to include symlinks to files.
    pub fn linked_files(mut self, include: bool) -> Self {
        self.linked_files = include;
        self
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Check a relative file path against the match patterns.
    pub fn match_file(&self, relative: impl AsRef<Path>) -> bool {
        match &self.matcher {
            None => true,
            Some(matcher) => matcher
                .matched_path_or_any_parents(relative.as_ref(), false)
                .is_ignore(),
        }
    }
}

impl EntryFilter for RecursionFilter {
    fn include(&self, path: &ScanPath) -> bool {
        if path.is_symlink() {
            if path.is_dir() && !self.linked_dirs {
                return false;
            }
            if path.is_file() && !self.linked_files {
                return false;
            }
        }

        if path.is_dir() {
            return true;
        }

        self.match_file(path.relative_str())
    }
}
