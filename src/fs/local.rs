//! Real filesystem backend

use super::{is_absence, EntryKind, FileSystem};
use std::io;
use std::path::Path;

/// Backend over `std::fs`
///
/// Uses `metadata`, so symlinks are followed the same way a stat would.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn entry_kind(&self, path: &Path) -> io::Result<EntryKind> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(EntryKind::Directory),
            Ok(meta) if meta.is_file() => Ok(EntryKind::File),
            Ok(_) => Ok(EntryKind::Other),
            Err(e) if is_absence(&e) => Ok(EntryKind::Missing),
            Err(e) => Err(e),
        }
    }
}
