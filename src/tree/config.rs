//! Configuration types for tree scanning

/// Configuration for scanning behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Recurse into symlinked directories. When false they become
    /// `LinkedDir` nodes.
    pub follow_links: bool,
    /// Record links that close a cycle as `CyclicLinkedDir` nodes instead of
    /// failing the scan.
    pub allow_cyclic_links: bool,
    /// Run the file transform once per real path, reusing the result for
    /// every other link to the same file.
    pub cache_file_transform: bool,
    /// Keep directories that end up without files or subdirectories.
    pub include_empty: bool,
    /// Number of parallel workers for the file transform.
    /// 0 = auto-detect (use all available cores)
    /// 1 = sequential (no parallelism)
    /// N = use N worker threads
    pub jobs: usize,
}

impl ScanConfig {
    pub fn is_parallel(&self) -> bool {
        self.jobs != 1
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_links: true,
            allow_cyclic_links: true,
            cache_file_transform: false,
            include_empty: false,
            jobs: 1,
        }
    }
}
