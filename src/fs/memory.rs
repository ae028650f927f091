//! In-memory filesystem backend

use super::{EntryKind, FileSystem};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

/// A tree of paths held in memory
///
/// Adding a file or directory registers every ancestor as a directory.
/// Paths registered with [`MemoryFs::with_failure`] answer with
/// `PermissionDenied`, which lets callers exercise error propagation.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    entries: BTreeMap<PathBuf, EntryKind>,
    failures: BTreeSet<PathBuf>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a list of file paths
    pub fn from_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        files
            .into_iter()
            .fold(Self::new(), |fs, file| fs.with_file(file))
    }

    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.add_ancestors(path);
        self.entries.insert(path.to_path_buf(), EntryKind::File);
        self
    }

    #[must_use]
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.add_ancestors(path);
        self.entries.insert(path.to_path_buf(), EntryKind::Directory);
        self
    }

    /// Make any query for `path` fail with `PermissionDenied`
    #[must_use]
    pub fn with_failure(mut self, path: impl AsRef<Path>) -> Self {
        self.failures.insert(path.as_ref().to_path_buf());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.entries
                .entry(ancestor.to_path_buf())
                .or_insert(EntryKind::Directory);
        }
    }
}

impl FileSystem for MemoryFs {
    fn entry_kind(&self, path: &Path) -> io::Result<EntryKind> {
        if self.failures.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("access denied: {}", path.display()),
            ));
        }
        Ok(self
            .entries
            .get(path)
            .copied()
            .unwrap_or(EntryKind::Missing))
    }
}
