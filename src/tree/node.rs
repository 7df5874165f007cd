//! Tree node types produced by a scan

use std::ops::Deref;

use serde::Serialize;

use crate::path::ScanPath;

/// A directory that was entered and fully listed.
///
/// `files` holds the file transform's result for each contained file and
/// `directories` the directory transform's result for each subdirectory,
/// both in sorted relative path order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirNode<F = ScanPath, D = Tree<F>> {
    pub path: ScanPath,
    pub files: Vec<F>,
    pub directories: Vec<D>,
}

/// A symlink to a directory that was not followed. Its contents are unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedDir {
    pub path: ScanPath,
}

/// A symlink that would re-enter `target_path`, a directory still open on
/// the branch being scanned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CyclicLinkedDir {
    pub path: ScanPath,
    pub target_path: ScanPath,
}

/// One directory position in a scanned tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node<F = ScanPath, D = Tree<F>> {
    Dir(DirNode<F, D>),
    Linked(LinkedDir),
    Cyclic(CyclicLinkedDir),
}

/// Borrowed child of a [`DirNode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a, F, D> {
    File(&'a F),
    Dir(&'a D),
}

impl<F, D> DirNode<F, D> {
    pub fn new(path: ScanPath, files: Vec<F>, directories: Vec<D>) -> Self {
        Self {
            path,
            files,
            directories,
        }
    }

    /// A directory node without children.
    pub fn leaf(path: ScanPath) -> Self {
        Self::new(path, Vec::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    /// Files followed by directories.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_, F, D>> {
        self.files
            .iter()
            .map(Entry::File)
            .chain(self.directories.iter().map(Entry::Dir))
    }
}

impl<F, D> Node<F, D> {
    pub fn path(&self) -> &ScanPath {
        match self {
            Node::Dir(dir) => &dir.path,
            Node::Linked(linked) => &linked.path,
            Node::Cyclic(cyclic) => &cyclic.path,
        }
    }

    /// Emptiness of the node. `None` for a [`LinkedDir`], whose children
    /// were never listed; a cyclic link always counts as non-empty.
    pub fn is_empty(&self) -> Option<bool> {
        match self {
            Node::Dir(dir) => Some(dir.is_empty()),
            Node::Linked(_) => None,
            Node::Cyclic(_) => Some(false),
        }
    }

    pub(crate) fn is_empty_dir(&self) -> bool {
        matches!(self, Node::Dir(dir) if dir.is_empty())
    }

    pub fn as_dir(&self) -> Option<&DirNode<F, D>> {
        match self {
            Node::Dir(dir) => Some(dir),
            _ => None,
        }
    }

    /// Whether this node is a leaf of the node graph: a link of either kind
    /// or an empty directory.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Node::Dir(dir) if !dir.is_empty())
    }
}

impl<F, D> From<DirNode<F, D>> for Node<F, D> {
    fn from(dir: DirNode<F, D>) -> Self {
        Node::Dir(dir)
    }
}

impl<F, D> From<LinkedDir> for Node<F, D> {
    fn from(linked: LinkedDir) -> Self {
        Node::Linked(linked)
    }
}

impl<F, D> From<CyclicLinkedDir> for Node<F, D> {
    fn from(cyclic: CyclicLinkedDir) -> Self {
        Node::Cyclic(cyclic)
    }
}

/// A fully materialized tree: every directory is kept as a node.
///
/// This is what a scan returns when no directory transform is given.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Tree<F = ScanPath>(pub Node<F, Tree<F>>);

impl<F> Deref for Tree<F> {
    type Target = Node<F, Tree<F>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<F> From<Node<F, Tree<F>>> for Tree<F> {
    fn from(node: Node<F, Tree<F>>) -> Self {
        Tree(node)
    }
}

impl<F> Tree<F> {
    /// Fold the tree bottom-up without touching the filesystem.
    ///
    /// Files of a directory go through `file_fn` first, then its
    /// subdirectories are folded, then the rebuilt node goes through
    /// `dir_fn`. Link nodes are passed to `dir_fn` unchanged.
    pub fn apply<G, R, FF, DF>(&self, file_fn: &mut FF, dir_fn: &mut DF) -> R
    where
        FF: FnMut(&F) -> G,
        DF: FnMut(Node<G, R>) -> R,
    {
        let node = match &self.0 {
            Node::Dir(dir) => {
                let files = dir.files.iter().map(&mut *file_fn).collect();
                let directories = dir
                    .directories
                    .iter()
                    .map(|child| child.apply(&mut *file_fn, &mut *dir_fn))
                    .collect();
                Node::Dir(DirNode::new(dir.path.clone(), files, directories))
            }
            Node::Linked(linked) => Node::Linked(linked.clone()),
            Node::Cyclic(cyclic) => Node::Cyclic(cyclic.clone()),
        };
        dir_fn(node)
    }
}

impl Tree<ScanPath> {
    /// Every leaf of the node graph sorted by relative path: all files,
    /// every link node and every empty directory.
    pub fn leafpaths(&self) -> Vec<ScanPath> {
        let mut leaves = Vec::new();
        let mut files = Vec::new();
        self.apply(
            &mut |path: &ScanPath| files.push(path.clone()),
            &mut |node: Node<(), ()>| {
                if node.is_leaf() {
                    leaves.push(node.path().clone());
                }
            },
        );
        leaves.append(&mut files);
        sort_by_relative(&mut leaves);
        leaves
    }

    /// All file paths sorted by relative path.
    pub fn filepaths(&self) -> Vec<ScanPath> {
        let mut files = Vec::new();
        self.apply(
            &mut |path: &ScanPath| files.push(path.clone()),
            &mut |_: Node<(), ()>| (),
        );
        sort_by_relative(&mut files);
        files
    }
}

pub(crate) fn sort_by_relative(paths: &mut [ScanPath]) {
    paths.sort_by(|a, b| a.relative().cmp(b.relative()));
}
