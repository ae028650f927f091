//! Filesystem access module
//!
//! The resolver only ever asks one question of storage: what kind of entry
//! lives at a path. Anything that can answer it implements [`FileSystem`]:
//! - [`LocalFs`] for the real disk
//! - [`MemoryFs`] for an in-memory tree (tests, previews)

mod local;
mod memory;

pub use local::LocalFs;
pub use memory::MemoryFs;

use std::io;
use std::path::Path;

/// Kind of entry found at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Nothing exists at the path
    Missing,
    /// A directory
    Directory,
    /// A regular file
    File,
    /// Something else (socket, fifo, device)
    Other,
}

impl EntryKind {
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }

    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }
}

/// Existence and type query against some storage
pub trait FileSystem {
    /// Classify the entry at `path`.
    ///
    /// A missing entry is `Ok(EntryKind::Missing)`. `Err` is reserved for
    /// failures that say nothing about existence (permissions, I/O).
    fn entry_kind(&self, path: &Path) -> io::Result<EntryKind>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn entry_kind(&self, path: &Path) -> io::Result<EntryKind> {
        (**self).entry_kind(path)
    }
}

/// Whether an I/O error means "no such entry"
///
/// `NotADirectory` shows up when a file sits where a directory was expected
/// (`file4.js/x`), `InvalidInput` and `InvalidFilename` (e.g. a segment over
/// the name length limit) when the name cannot exist at all.
pub fn is_absence(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::InvalidFilename
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absence_kinds() {
        assert!(is_absence(&io::Error::from(io::ErrorKind::NotFound)));
        assert!(is_absence(&io::Error::from(io::ErrorKind::NotADirectory)));
        assert!(is_absence(&io::Error::from(io::ErrorKind::InvalidInput)));
        assert!(is_absence(&io::Error::from(io::ErrorKind::InvalidFilename)));
        assert!(!is_absence(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }

    #[test]
    fn test_entry_kind_predicates() {
        assert!(EntryKind::Directory.is_dir());
        assert!(!EntryKind::Directory.is_file());
        assert!(EntryKind::File.is_file());
        assert!(!EntryKind::Other.is_file());
        assert!(!EntryKind::Missing.is_dir());
    }
}
