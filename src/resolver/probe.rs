//! Filesystem probes
//!
//! Leaf checks the resolver runs against `base/working.../segment`.

use super::ResolveOptions;
use crate::error::ResolveError;
use crate::fs::{EntryKind, FileSystem};
use crate::logger;
use std::path::{Path, PathBuf};

/// A file that exists under one or more of the accepted extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    /// Path relative to the base directory, without extension
    pub(crate) file_path: PathBuf,
    /// Bare file name
    pub(crate) file: String,
    /// Matched extensions, in preference order, never empty
    pub(crate) extensions: Vec<String>,
}

impl FileMatch {
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

/// Whether a segment can be used as a single path component
///
/// The tokenizer never yields unsafe segments; pre-split input can.
pub fn is_safe_segment(segment: &str) -> bool {
    !matches!(segment, "." | "..") && !segment.contains(['/', '\\', '\0'])
}

/// Probe set bound to one base directory and option set
pub struct Probe<'a, F: ?Sized> {
    fs: &'a F,
    base: &'a Path,
    options: &'a ResolveOptions,
}

impl<'a, F: FileSystem + ?Sized> Probe<'a, F> {
    pub const fn new(fs: &'a F, base: &'a Path, options: &'a ResolveOptions) -> Self {
        Self { fs, base, options }
    }

    /// True iff `base/working.../segment` is a directory
    pub fn is_dir(&self, working: &[String], segment: &str) -> Result<bool, ResolveError> {
        if segment.is_empty() || !self.check_segment(segment) {
            return Ok(false);
        }
        let path = self.absolute(working, segment);
        Ok(self.kind(&path)?.is_dir())
    }

    /// Look for `segment.<ext>` in the working directory
    ///
    /// An empty segment stands for the default page.
    pub fn find_file(
        &self,
        working: &[String],
        segment: &str,
    ) -> Result<Option<FileMatch>, ResolveError> {
        if segment.is_empty() {
            return self.find_default_page(working);
        }
        if !self.check_segment(segment) {
            return Ok(None);
        }
        self.find_named(working, segment)
    }

    /// First default page that exists in the working directory
    pub fn find_default_page(&self, working: &[String]) -> Result<Option<FileMatch>, ResolveError> {
        for name in &self.options.default_pages {
            if let Some(found) = self.find_named(working, name)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn find_named(&self, working: &[String], name: &str) -> Result<Option<FileMatch>, ResolveError> {
        let dir = self.absolute_dir(working);
        let mut extensions = Vec::new();

        for extension in &self.options.extensions {
            let candidate = dir.join(format!("{name}.{extension}"));
            if self.kind(&candidate)?.is_file() {
                extensions.push(extension.clone());
            }
        }

        if extensions.is_empty() {
            return Ok(None);
        }

        let mut file_path: PathBuf = working.iter().collect();
        file_path.push(name);
        Ok(Some(FileMatch {
            file_path,
            file: name.to_string(),
            extensions,
        }))
    }

    fn check_segment(&self, segment: &str) -> bool {
        let safe = is_safe_segment(segment);
        if !safe {
            logger::log_blocked_segment(self.base, segment);
        }
        safe
    }

    fn kind(&self, path: &Path) -> Result<EntryKind, ResolveError> {
        self.fs
            .entry_kind(path)
            .map_err(|e| ResolveError::filesystem(path, e))
    }

    fn absolute_dir(&self, working: &[String]) -> PathBuf {
        let mut dir = self.base.to_path_buf();
        dir.extend(working);
        dir
    }

    fn absolute(&self, working: &[String], segment: &str) -> PathBuf {
        let mut path = self.absolute_dir(working);
        path.push(segment);
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;

    fn webroot() -> MemoryFs {
        MemoryFs::from_files([
            "webroot/index.js",
            "webroot/dir1/dir2/index.js",
            "webroot/dir1/dir2/file3.js",
            "webroot/dir1/file4.js",
            "webroot/dir1/file4.hbs",
        ])
    }

    fn options(extensions: &[&str]) -> ResolveOptions {
        ResolveOptions::new(extensions.iter().copied())
    }

    fn working(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_is_dir() {
        let fs = webroot();
        let opts = options(&["js"]);
        let probe = Probe::new(&fs, Path::new("webroot"), &opts);

        assert!(probe.is_dir(&[], "dir1").unwrap());
        assert!(probe.is_dir(&working(&["dir1"]), "dir2").unwrap());
        assert!(!probe.is_dir(&working(&["dir1"]), "file4").unwrap());
        assert!(!probe.is_dir(&[], "").unwrap());
    }

    #[test]
    fn test_find_file_extension_order() {
        let fs = webroot();
        let opts = options(&["hbs", "js"]);
        let probe = Probe::new(&fs, Path::new("webroot"), &opts);

        let found = probe.find_file(&working(&["dir1"]), "file4").unwrap().unwrap();
        assert_eq!(found.extensions(), ["hbs", "js"]);
        assert_eq!(found.file(), "file4");
        assert_eq!(found.file_path, PathBuf::from("dir1/file4"));
    }

    #[test]
    fn test_find_file_filters_missing_extensions() {
        let fs = webroot();
        let opts = options(&["js", "hbs"]);
        let probe = Probe::new(&fs, Path::new("webroot"), &opts);

        let found = probe
            .find_file(&working(&["dir1", "dir2"]), "file3")
            .unwrap()
            .unwrap();
        assert_eq!(found.extensions(), ["js"]);
    }

    #[test]
    fn test_empty_segment_is_default_page() {
        let fs = webroot();
        let opts = options(&["js"]);
        let probe = Probe::new(&fs, Path::new("webroot"), &opts);

        let found = probe.find_file(&[], "").unwrap().unwrap();
        assert_eq!(found.file(), "index");
        assert_eq!(found.file_path, PathBuf::from("index"));
    }

    #[test]
    fn test_custom_default_pages() {
        let fs = MemoryFs::from_files(["webroot/home.js"]);
        let opts = options(&["js"]).with_default_pages(["index", "home"]);
        let probe = Probe::new(&fs, Path::new("webroot"), &opts);

        let found = probe.find_default_page(&[]).unwrap().unwrap();
        assert_eq!(found.file(), "home");
    }

    #[test]
    fn test_no_extensions_never_match() {
        let fs = webroot();
        let opts = options(&[]);
        let probe = Probe::new(&fs, Path::new("webroot"), &opts);

        assert!(probe.find_file(&[], "index").unwrap().is_none());
    }

    #[test]
    fn test_unsafe_segments_are_not_probed() {
        let fs = webroot().with_failure("webroot/..");
        let opts = options(&["js"]);
        let probe = Probe::new(&fs, Path::new("webroot"), &opts);

        assert!(!probe.is_dir(&[], "..").unwrap());
        assert!(probe.find_file(&[], "../index").unwrap().is_none());
        assert!(!is_safe_segment("a\\b"));
        assert!(is_safe_segment(":id"));
    }

    #[test]
    fn test_probe_error_propagates() {
        let fs = webroot().with_failure("webroot/dir1/file4.js");
        let opts = options(&["js"]);
        let probe = Probe::new(&fs, Path::new("webroot"), &opts);

        let err = probe.find_file(&working(&["dir1"]), "file4").unwrap_err();
        assert_eq!(err.path(), Path::new("webroot/dir1/file4.js"));
    }
}
