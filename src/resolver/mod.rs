//! Path resolver module
//!
//! Maps a request path onto a file under a base directory:
//! - Directories in the path are descended into
//! - Segments that match nothing become parameters of the directory or file
//!   that absorbed them
//! - Non-canonical paths (missing trailing slash, literal `index`) produce a
//!   redirect instead of a match

mod cascade;
mod outcome;
mod probe;
mod tokenize;

pub use cascade::{Rule, Walk};
pub use outcome::{Found, Param, Redirect, Resolution, TargetKind};
pub use probe::{is_safe_segment, FileMatch, Probe};
pub use tokenize::{normalize, tokenize, RequestPath};

use crate::error::ResolveError;
use crate::fs::{FileSystem, LocalFs};
use crate::logger::{self, ResolutionLogEntry};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const DEFAULT_PAGE: &str = "index";
pub const DEFAULT_EXTENSION: &str = "js";

/// Options for one resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Accepted extensions, most preferred first, without the dot
    pub extensions: Vec<String>,
    /// Names that stand for "the page of this directory"
    pub default_pages: Vec<String>,
    /// Redirect literal default page segments to their directory
    pub squash_default_page: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            default_pages: vec![DEFAULT_PAGE.to_string()],
            squash_default_page: true,
        }
    }
}

impl ResolveOptions {
    /// Options accepting `extensions`, defaults otherwise
    ///
    /// A leading dot is stripped and empty names are dropped. An empty list
    /// is allowed; nothing will ever match.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: clean_names(extensions, |e| e.trim_start_matches('.')),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_default_pages<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.default_pages = clean_names(pages, str::trim);
        self
    }

    #[must_use]
    pub const fn with_squash(mut self, squash_default_page: bool) -> Self {
        self.squash_default_page = squash_default_page;
        self
    }

    pub fn is_default_page(&self, name: &str) -> bool {
        self.default_pages.iter().any(|page| page == name)
    }
}

fn clean_names<I, S>(names: I, clean: impl Fn(&str) -> &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| clean(name.as_ref()).to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Resolver bound to a base directory and a storage backend
#[derive(Debug, Clone)]
pub struct Resolver<F = LocalFs> {
    fs: F,
    base: PathBuf,
    options: ResolveOptions,
}

impl Resolver<LocalFs> {
    /// Resolver over the real filesystem
    pub fn new(base: impl Into<PathBuf>, options: ResolveOptions) -> Self {
        Self::with_fs(LocalFs, base, options)
    }
}

impl<F: FileSystem> Resolver<F> {
    pub fn with_fs(fs: F, base: impl Into<PathBuf>, options: ResolveOptions) -> Self {
        if options.extensions.is_empty() {
            logger::log_warning("Resolver has no extensions configured; no file can match");
        }
        Self {
            fs,
            base: base.into(),
            options,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve a request path or a pre-split segment list
    pub fn resolve(&self, path: impl Into<RequestPath>) -> Result<Resolution, ResolveError> {
        let started = Instant::now();
        let request = path.into();
        let display = match &request {
            RequestPath::Url(url) => url.clone(),
            RequestPath::Segments(segments) => format!("/{}", segments.join("/")),
        };
        let segments = request.into_segments();

        let probe = Probe::new(&self.fs, &self.base, &self.options);
        let result = Walk::new(probe, &self.options, &segments).run();

        match &result {
            Ok(resolution) => {
                let entry = ResolutionLogEntry::new(display, resolution, started.elapsed());
                logger::log_resolution(&entry);
            }
            Err(e) => logger::log_error(&format!("Failed to resolve '{display}': {e}")),
        }
        result
    }
}

/// Resolve `path` against `base` on the real filesystem
pub fn resolve(
    base: impl AsRef<Path>,
    path: impl Into<RequestPath>,
    options: &ResolveOptions,
) -> Result<Resolution, ResolveError> {
    Resolver::new(base.as_ref(), options.clone()).resolve(path)
}
