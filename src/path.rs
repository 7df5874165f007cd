//! Path identity for scanned entries
//!
//! A `ScanPath` pairs the location of an entry relative to the scan root with
//! its canonical (real) path, and caches the OS metadata queried about it.
//! Every property is fetched from the OS at most once per value.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::{self, FileType, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Identity of a directory entry found during a scan.
///
/// `root` is the directory the scan started from (as given), `relative` is
/// the entry's path below it (empty for the root itself) and `real` is the
/// fully resolved path, used as the identity key for cycle detection.
#[derive(Clone)]
pub struct ScanPath {
    root: Arc<Path>,
    relative: PathBuf,
    real: PathBuf,
    entry: EntryCache,
}

/// Lazily populated OS metadata for one entry.
#[derive(Clone, Default)]
struct EntryCache {
    name: OsString,
    /// Type of the entry itself, not following links.
    file_type: OnceLock<Option<FileType>>,
    /// Type of the link target. Only consulted for symlinks.
    target_type: OnceLock<Option<FileType>>,
    metadata: OnceLock<Metadata>,
    symlink_metadata: OnceLock<Metadata>,
}

impl EntryCache {
    fn new(name: OsString) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }
}

impl ScanPath {
    /// Identity for the root of a scan.
    ///
    /// Fails if `directory` does not exist (or cannot be resolved).
    pub fn from_root(directory: impl AsRef<Path>) -> io::Result<Self> {
        let directory = directory.as_ref();
        let real = fs::canonicalize(directory)?;
        // "foo/..", "." and "/" have no usable file name of their own
        let name = directory
            .file_name()
            .or_else(|| real.file_name())
            .map(OsStr::to_os_string)
            .unwrap_or_default();

        Ok(Self {
            root: Arc::from(directory),
            relative: PathBuf::new(),
            real,
            entry: EntryCache::new(name),
        })
    }

    /// Same entry addressed from a different scan root.
    ///
    /// `root.join(relative)` must name the same entry as `self.absolute()`.
    pub(crate) fn rebased(self, root: impl AsRef<Path>, relative: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::from(root.as_ref()),
            relative: relative.into(),
            ..self
        }
    }

    /// Derive the identity of a child entry returned by `read_dir`.
    fn join(&self, dir_entry: &fs::DirEntry) -> Self {
        let name = dir_entry.file_name();
        let relative = self.relative.join(&name);
        let mut real = self.real.join(&name);

        // on failure the type is looked up again lazily, where the error surfaces
        let file_type = dir_entry.file_type().ok();
        if file_type.is_some_and(|t| t.is_symlink()) {
            // Only links can redirect the subtree, so only they pay for
            // canonicalization. Broken links keep the joined path.
            real = fs::canonicalize(&real).unwrap_or(real);
        }

        let entry = EntryCache::new(name);
        if let Some(file_type) = file_type {
            let _ = entry.file_type.set(Some(file_type));
        }

        Self {
            root: Arc::clone(&self.root),
            relative,
            real,
            entry,
        }
    }

    /// Iterate over the immediate children of this entry.
    ///
    /// Nothing is sorted or filtered here; entries come in OS order.
    pub fn scandir(&self) -> io::Result<impl Iterator<Item = io::Result<ScanPath>> + '_> {
        let entries = fs::read_dir(self.absolute())?;
        Ok(entries.map(move |entry| entry.map(|e| self.join(&e))))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn real(&self) -> &Path {
        &self.real
    }

    /// Path of this entry as reached from the scan root.
    pub fn absolute(&self) -> PathBuf {
        if self.relative.as_os_str().is_empty() {
            // joining "" would append a trailing separator
            self.root.to_path_buf()
        } else {
            self.root.join(&self.relative)
        }
    }

    pub fn name(&self) -> &OsStr {
        &self.entry.name
    }

    /// Relative path with `/` separators, as matched by filters.
    pub fn relative_str(&self) -> String {
        let relative = self.relative.to_string_lossy();
        if std::path::MAIN_SEPARATOR == '/' {
            relative.into_owned()
        } else {
            relative.replace(std::path::MAIN_SEPARATOR, "/")
        }
    }

    /// Type of the entry itself. `None` once the entry is gone.
    fn file_type(&self) -> io::Result<Option<FileType>> {
        cached_type(&self.entry.file_type, || self.symlink_stat())
    }

    /// Type of the link target. `None` for a broken link.
    fn target_type(&self) -> io::Result<Option<FileType>> {
        cached_type(&self.entry.target_type, || self.stat())
    }

    fn resolved_type(&self) -> io::Result<Option<FileType>> {
        match self.file_type()? {
            Some(t) if t.is_symlink() => self.target_type(),
            other => Ok(other),
        }
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.file_type(), Ok(Some(t)) if t.is_symlink())
    }

    /// Whether this is a directory, following symlinks. Lookup errors other
    /// than a missing entry are returned.
    pub fn try_is_dir(&self) -> io::Result<bool> {
        Ok(self.resolved_type()?.is_some_and(|t| t.is_dir()))
    }

    /// Whether this is a regular file, following symlinks. Lookup errors
    /// other than a missing entry are returned.
    pub fn try_is_file(&self) -> io::Result<bool> {
        Ok(self.resolved_type()?.is_some_and(|t| t.is_file()))
    }

    /// Like [`try_is_dir`](Self::try_is_dir), with errors counting as `false`.
    pub fn is_dir(&self) -> bool {
        self.try_is_dir().unwrap_or(false)
    }

    pub fn is_dir_nofollow(&self) -> bool {
        matches!(self.file_type(), Ok(Some(t)) if t.is_dir())
    }

    /// Like [`try_is_file`](Self::try_is_file), with errors counting as `false`.
    pub fn is_file(&self) -> bool {
        self.try_is_file().unwrap_or(false)
    }

    pub fn is_file_nofollow(&self) -> bool {
        matches!(self.file_type(), Ok(Some(t)) if t.is_file())
    }

    /// Metadata following symlinks. Failed lookups are not cached.
    pub fn stat(&self) -> io::Result<&Metadata> {
        if let Some(metadata) = self.entry.metadata.get() {
            return Ok(metadata);
        }
        let metadata = fs::metadata(self.absolute())?;
        Ok(self.entry.metadata.get_or_init(|| metadata))
    }

    /// Metadata of the entry itself. Failed lookups are not cached.
    pub fn symlink_stat(&self) -> io::Result<&Metadata> {
        if let Some(metadata) = self.entry.symlink_metadata.get() {
            return Ok(metadata);
        }
        let metadata = fs::symlink_metadata(self.absolute())?;
        Ok(self.entry.symlink_metadata.get_or_init(|| metadata))
    }

    #[cfg(unix)]
    pub fn inode(&self) -> io::Result<u64> {
        self.symlink_stat().map(|m| m.ino())
    }

    fn stat_key(&self) -> Option<StatKey> {
        self.stat().ok().map(StatKey::from)
    }

    fn symlink_stat_key(&self) -> Option<StatKey> {
        self.symlink_stat().ok().map(StatKey::from)
    }
}

/// Cache a file type lookup. A missing entry is cached as `None`, other
/// errors are returned and retried on the next call.
fn cached_type<'a>(
    cell: &OnceLock<Option<FileType>>,
    lookup: impl FnOnce() -> io::Result<&'a Metadata>,
) -> io::Result<Option<FileType>> {
    if let Some(file_type) = cell.get() {
        return Ok(*file_type);
    }
    let file_type = match lookup() {
        Ok(metadata) => Some(metadata.file_type()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };
    Ok(*cell.get_or_init(|| file_type))
}

/// The stat fields that identify an entry. Access time is left out since
/// merely reading a file may move it.
#[derive(Debug, PartialEq, Eq)]
struct StatKey {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
    #[cfg(unix)]
    mode: u32,
    #[cfg(unix)]
    nlink: u64,
    len: u64,
    modified: Option<std::time::SystemTime>,
}

impl From<&Metadata> for StatKey {
    fn from(metadata: &Metadata) -> Self {
        Self {
            #[cfg(unix)]
            dev: metadata.dev(),
            #[cfg(unix)]
            ino: metadata.ino(),
            #[cfg(unix)]
            mode: metadata.mode(),
            #[cfg(unix)]
            nlink: metadata.nlink(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        }
    }
}

impl PartialEq for ScanPath {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
            && self.relative == other.relative
            && self.real == other.real
            && self.name() == other.name()
            && self.is_symlink() == other.is_symlink()
            && self.is_dir() == other.is_dir()
            && self.is_dir_nofollow() == other.is_dir_nofollow()
            && self.is_file() == other.is_file()
            && self.is_file_nofollow() == other.is_file_nofollow()
            && self.stat_key() == other.stat_key()
            && self.symlink_stat_key() == other.symlink_stat_key()
    }
}

impl fmt::Debug for ScanPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanPath")
            .field("root", &self.root)
            .field("relative", &self.relative)
            .field("real", &self.real)
            .finish()
    }
}

impl Serialize for ScanPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScanPath", 2)?;
        state.serialize_field("relative", &self.relative_str())?;
        state.serialize_field("real", &self.real)?;
        state.end()
    }
}
