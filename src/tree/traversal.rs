//! Depth-first traversal with symlink cycle detection.
//!
//! Only the directories open on the current branch are tracked, keyed by
//! real path. A followed link whose real path is already open closes a
//! cycle. The same real directory reached on sibling branches is fine.

use std::collections::HashMap;
use std::io;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::ScanError;
use crate::filter::EntryFilter;
use crate::path::ScanPath;

use super::config::ScanConfig;
use super::node::{CyclicLinkedDir, DirNode, LinkedDir, Node, sort_by_relative};

/// Traversal state shared by the sequential and parallel scans.
pub struct Traversal<'a> {
    pub config: &'a ScanConfig,
    pub filter: &'a dyn EntryFilter,
}

impl<'a> Traversal<'a> {
    pub fn new(config: &'a ScanConfig, filter: &'a dyn EntryFilter) -> Self {
        Self { config, filter }
    }

    /// Walk the tree below `root`.
    ///
    /// Every file goes through `file_fn` and every kept subdirectory node
    /// through `dir_fn`. The root node itself is returned untransformed.
    pub fn walk<F, D, FF, DF>(
        &self,
        root: ScanPath,
        file_fn: &mut FF,
        dir_fn: &mut DF,
    ) -> Result<Node<F, D>, ScanError>
    where
        FF: FnMut(ScanPath) -> F,
        DF: FnMut(Node<F, D>) -> D,
    {
        let mut ancestors = Ancestors::default();
        self.walk_dir(root, &mut ancestors, file_fn, dir_fn)
    }

    fn walk_dir<F, D, FF, DF>(
        &self,
        path: ScanPath,
        ancestors: &mut Ancestors,
        file_fn: &mut FF,
        dir_fn: &mut DF,
    ) -> Result<Node<F, D>, ScanError>
    where
        FF: FnMut(ScanPath) -> F,
        DF: FnMut(Node<F, D>) -> D,
    {
        if path.is_symlink() {
            if !self.config.follow_links {
                return Ok(Node::Linked(LinkedDir { path }));
            }
            if let Some(target) = ancestors.get(path.real()) {
                let target_path = target.clone();
                if !self.config.allow_cyclic_links {
                    return Err(ScanError::recursion(path, target_path));
                }
                debug!(
                    link = %path.absolute().display(),
                    target = %target_path.absolute().display(),
                    "cyclic symlink"
                );
                return Ok(Node::Cyclic(CyclicLinkedDir { path, target_path }));
            }
        }

        let mut ancestors = ancestors.enter(&path);
        trace!(path = %path.absolute().display(), "scanning directory");

        let mut files = Vec::new();
        let mut directories = Vec::new();
        for child in self.read_children(&path)? {
            let (is_dir, is_file) = child_type(&child)?;
            if is_dir {
                let also_file = is_file.then(|| child.clone());
                let node = self.walk_dir(child, &mut ancestors, file_fn, dir_fn)?;
                if self.config.include_empty || !node.is_empty_dir() {
                    directories.push(dir_fn(node));
                }
                if let Some(file) = also_file {
                    files.push(file_fn(file));
                }
            } else if is_file {
                files.push(file_fn(child));
            }
            // anything else (sockets, devices, broken links) is left out
        }

        Ok(Node::Dir(DirNode::new(path, files, directories)))
    }

    /// Read, filter, and sort directory entries
    fn read_children(&self, path: &ScanPath) -> Result<Vec<ScanPath>, ScanError> {
        let absolute = path.absolute();
        let entries = path
            .scandir()
            .and_then(|entries| entries.collect::<io::Result<Vec<_>>>())
            .map_err(|e| ScanError::io(&absolute, e))?;

        let mut children = self.filter.apply(entries);
        sort_by_relative(&mut children);
        Ok(children)
    }
}

/// Directory and file checks for a child, following symlinks. A vanished
/// entry or broken link is neither; any other lookup failure is an error.
fn child_type(child: &ScanPath) -> Result<(bool, bool), ScanError> {
    let is_dir = child
        .try_is_dir()
        .map_err(|e| ScanError::io(child.absolute(), e))?;
    let is_file = child
        .try_is_file()
        .map_err(|e| ScanError::io(child.absolute(), e))?;
    Ok((is_dir, is_file))
}

/// Directories open on the current branch, by real path.
#[derive(Debug, Default)]
struct Ancestors(HashMap<PathBuf, ScanPath>);

impl Ancestors {
    fn get(&self, real: &Path) -> Option<&ScanPath> {
        self.0.get(real)
    }

    /// Register `path` until the returned guard is dropped.
    fn enter(&mut self, path: &ScanPath) -> AncestorGuard<'_> {
        let real = path.real().to_path_buf();
        let previous = self.0.insert(real.clone(), path.clone());
        AncestorGuard {
            ancestors: self,
            real,
            previous,
        }
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Removes its directory from [`Ancestors`] on every exit path.
struct AncestorGuard<'a> {
    ancestors: &'a mut Ancestors,
    real: PathBuf,
    previous: Option<ScanPath>,
}

impl Deref for AncestorGuard<'_> {
    type Target = Ancestors;

    fn deref(&self) -> &Ancestors {
        self.ancestors
    }
}

impl DerefMut for AncestorGuard<'_> {
    fn deref_mut(&mut self) -> &mut Ancestors {
        self.ancestors
    }
}

impl Drop for AncestorGuard<'_> {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => {
                self.ancestors.0.insert(std::mem::take(&mut self.real), previous);
            }
            None => {
                self.ancestors.0.remove(&self.real);
            }
        }
    }
}
