//! Scanner - the entry point for building or folding a directory tree

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ScanError;
use crate::filter::{AcceptAll, EntryFilter};
use crate::path::ScanPath;

use super::config::ScanConfig;
use super::node::{Node, Tree};
use super::parallel::{FileRecorder, map_files};
use super::traversal::Traversal;

/// Scans a directory into a [`Tree`], or folds it into any other value.
pub struct Scanner {
    config: ScanConfig,
    filter: Box<dyn EntryFilter>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            filter: Box::new(AcceptAll),
        }
    }

    pub fn with_filter(mut self, filter: impl EntryFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Scan `root` into a fully materialized tree.
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<Tree, ScanError> {
        self.scan_with(root, |path| path, Tree)
    }

    /// Scan `root`, passing every file through `file_fn` and every
    /// directory node (root included, bottom-up) through `dir_fn`.
    ///
    /// In sequential mode nothing but the current branch is kept, so
    /// `dir_fn` can reduce the tree while it is read. With `jobs != 1` the
    /// whole tree is held in memory until the file results are in.
    pub fn scan_with<F, D, FF, DF>(
        &self,
        root: impl AsRef<Path>,
        file_fn: FF,
        mut dir_fn: DF,
    ) -> Result<D, ScanError>
    where
        F: Clone + Send,
        FF: Fn(ScanPath) -> F + Sync,
        DF: FnMut(Node<F, D>) -> D,
    {
        let root = root.as_ref();
        verify_is_directory(root)?;
        let root_path = ScanPath::from_root(root).map_err(|e| ScanError::io(root, e))?;

        debug!(
            root = %root.display(),
            follow_links = self.config.follow_links,
            allow_cyclic_links = self.config.allow_cyclic_links,
            include_empty = self.config.include_empty,
            jobs = self.config.jobs,
            "starting scan"
        );

        let result = if self.config.is_parallel() {
            self.scan_parallel(root_path, &file_fn, &mut dir_fn)
        } else {
            self.scan_sequential(root_path, &file_fn, &mut dir_fn)
        };

        debug!(root = %root.display(), ok = result.is_ok(), "scan finished");
        result
    }

    fn scan_sequential<F, D, FF, DF>(
        &self,
        root: ScanPath,
        file_fn: &FF,
        dir_fn: &mut DF,
    ) -> Result<D, ScanError>
    where
        F: Clone,
        FF: Fn(ScanPath) -> F,
        DF: FnMut(Node<F, D>) -> D,
    {
        let traversal = Traversal::new(&self.config, self.filter.as_ref());
        let node = if self.config.cache_file_transform {
            let mut cache = RealPathCache::default();
            traversal.walk(root, &mut |path| cache.get_or_insert_with(path, file_fn), dir_fn)?
        } else {
            traversal.walk(root, &mut |path| file_fn(path), dir_fn)?
        };
        Ok(dir_fn(node))
    }

    /// Record file identities in a first pass, run `file_fn` on the worker
    /// pool, then refold the recorded tree with the results.
    fn scan_parallel<F, D, FF, DF>(
        &self,
        root: ScanPath,
        file_fn: &FF,
        dir_fn: &mut DF,
    ) -> Result<D, ScanError>
    where
        F: Clone + Send,
        FF: Fn(ScanPath) -> F + Sync,
        DF: FnMut(Node<F, D>) -> D,
    {
        let traversal = Traversal::new(&self.config, self.filter.as_ref());
        let mut recorder = FileRecorder::new(self.config.cache_file_transform);
        let placeholders = Tree(traversal.walk(
            root,
            &mut |path| recorder.record(path),
            &mut Tree,
        )?);

        let paths = recorder.into_paths();
        debug!(files = paths.len(), jobs = self.config.jobs, "applying file transform");
        let results = map_files(paths, file_fn, self.config.jobs);

        Ok(placeholders.apply(&mut |&index: &usize| results[index].clone(), dir_fn))
    }
}

/// Scan `root` with default settings.
pub fn scantree(root: impl AsRef<Path>) -> Result<Tree, ScanError> {
    Scanner::default().scan(root)
}

fn verify_is_directory(directory: &Path) -> Result<(), ScanError> {
    if !directory.exists() {
        return Err(ScanError::NotFound {
            path: directory.to_path_buf(),
        });
    }
    if !directory.is_dir() {
        return Err(ScanError::NotADirectory {
            path: directory.to_path_buf(),
        });
    }
    Ok(())
}

/// File transform results by real path.
struct RealPathCache<T> {
    results: HashMap<PathBuf, T>,
}

impl<T> Default for RealPathCache<T> {
    fn default() -> Self {
        Self {
            results: HashMap::new(),
        }
    }
}

impl<T: Clone> RealPathCache<T> {
    fn get_or_insert_with(&mut self, path: ScanPath, f: impl FnOnce(ScanPath) -> T) -> T {
        if let Some(result) = self.results.get(path.real()) {
            return result.clone();
        }
        let real = path.real().to_path_buf();
        let result = f(path);
        self.results.insert(real, result.clone());
        result
    }
}
