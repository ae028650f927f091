//! Resolver error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a resolution
///
/// A path that matches nothing is not an error; see `Resolution::NotFound`.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("filesystem error when probing `{}`", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Path whose probe failed
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Filesystem { path, .. } => path,
        }
    }
}
