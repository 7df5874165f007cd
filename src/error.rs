//! Error types for scanning operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::path::ScanPath;

/// Errors that can occur during a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("{}: No such directory", .path.display())]
    NotFound { path: PathBuf },

    /// The scan root exists but is not a directory.
    #[error("{}: Is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    /// A followed symlink points back to a directory still open on the
    /// current branch. `target` is that ancestor, `path` the closing link.
    #[error(
        "Symlink recursion: Real path '{}' was encountered at '{}' and then '{}'.",
        .path.real().display(),
        .target.absolute().display(),
        .path.absolute().display()
    )]
    SymlinkRecursion {
        path: Box<ScanPath>,
        target: Box<ScanPath>,
    },

    /// An operating system error, passed through with the path it concerns.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A match pattern could not be compiled.
    #[error("Invalid match pattern: {0}")]
    InvalidPattern(#[from] ignore::Error),
}

/// Coarse classification of a [`ScanError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid scan root, raised before traversal starts.
    Precondition,
    /// Cyclic symlink with cycles disallowed.
    Cycle,
    /// Failure reported by the filesystem.
    Io,
    /// Bad filter configuration.
    Config,
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn recursion(path: ScanPath, target: ScanPath) -> Self {
        Self::SymlinkRecursion {
            path: Box::new(path),
            target: Box::new(target),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } | Self::NotADirectory { .. } => ErrorKind::Precondition,
            Self::SymlinkRecursion { .. } => ErrorKind::Cycle,
            Self::Io { .. } => ErrorKind::Io,
            Self::InvalidPattern(_) => ErrorKind::Config,
        }
    }
}
