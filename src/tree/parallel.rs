//! Parallel file transform support
//!
//! The first pass records each file's `ScanPath` and leaves its index in the
//! tree. The transform then runs over the recorded list on a rayon pool and
//! the placeholder tree is refolded with the results.

use std::collections::HashMap;
use std::path::PathBuf;

use rayon::prelude::*;
use tracing::warn;

use crate::path::ScanPath;

/// Assigns sequential indices to files in the order they are visited.
#[derive(Debug, Default)]
pub struct FileRecorder {
    paths: Vec<ScanPath>,
    /// Index by real path, when deduplicating.
    seen: Option<HashMap<PathBuf, usize>>,
}

impl FileRecorder {
    /// With `dedup_real_paths`, files sharing a real path share one index.
    pub fn new(dedup_real_paths: bool) -> Self {
        Self {
            paths: Vec::new(),
            seen: dedup_real_paths.then(HashMap::new),
        }
    }

    pub fn record(&mut self, path: ScanPath) -> usize {
        let index = self.paths.len();
        if let Some(seen) = &mut self.seen {
            if let Some(&existing) = seen.get(path.real()) {
                return existing;
            }
            seen.insert(path.real().to_path_buf(), index);
        }
        self.paths.push(path);
        index
    }

    pub fn into_paths(self) -> Vec<ScanPath> {
        self.paths
    }
}

/// Apply `file_fn` to every path on a pool of `jobs` workers (0 = all
/// cores), keeping input order in the output.
pub fn map_files<F, FF>(paths: Vec<ScanPath>, file_fn: &FF, jobs: usize) -> Vec<F>
where
    F: Send,
    FF: Fn(ScanPath) -> F + Sync,
{
    let run = move || -> Vec<F> { paths.into_par_iter().map(file_fn).collect() };

    if jobs == 0 {
        // Auto-detect: use rayon's default thread pool
        return run();
    }

    match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => pool.install(run),
        Err(err) => {
            // Fall back to rayon's global pool if custom pool creation fails
            warn!(jobs, error = %err, "could not build worker pool, using global pool");
            run()
        }
    }
}
