//! Resolution outcome types

use super::probe::FileMatch;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A path segment bound to the directory or file that absorbed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub value: String,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for Param {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// Canonical location the caller should redirect to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub location: String,
}

impl Redirect {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Location prefixed with the mount point the resolver is served under
    pub fn location_with_base(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.location)
    }
}

/// A matched file plus the parameters collected on the way to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Found {
    /// Path relative to the base directory, without extension
    pub file_path: PathBuf,
    /// File name without extension
    pub file: String,
    /// File name with the preferred extension
    pub filename: String,
    /// Every extension present for this file, in preference order
    pub extensions: Vec<String>,
    /// Parameters in discovery order
    pub params: Vec<Param>,
}

/// How a dispatcher should treat a found file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// The preferred file is a template; render it directly
    Template,
    /// The preferred file is code, optionally with a template sibling
    Module { has_template: bool },
}

impl Found {
    pub(crate) fn new(matched: FileMatch, params: Vec<Param>) -> Self {
        let FileMatch {
            file_path,
            file,
            extensions,
        } = matched;
        let filename = format!("{file}.{}", extensions.first().map_or("", String::as_str));
        Self {
            file_path,
            file,
            filename,
            extensions,
            params,
        }
    }

    /// First extension in preference order that exists on disk
    pub fn preferred_extension(&self) -> &str {
        self.extensions.first().map_or("", String::as_str)
    }

    /// Full path of the preferred file under `base`
    pub fn target_path(&self, base: &Path) -> PathBuf {
        base.join(&self.file_path).with_file_name(&self.filename)
    }

    pub fn kind(&self, template_extension: Option<&str>) -> TargetKind {
        match template_extension {
            Some(ext) if self.preferred_extension() == ext => TargetKind::Template,
            Some(ext) => TargetKind::Module {
                has_template: self.extensions.iter().any(|e| e == ext),
            },
            None => TargetKind::Module {
                has_template: false,
            },
        }
    }

    /// Parameters merged by name; a later binding overwrites an earlier one
    pub fn param_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect()
    }

    /// Parameter names in the order they were bound
    pub fn param_order(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Result of resolving one request path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Redirect(Redirect),
    Found(Found),
    NotFound,
}

impl Resolution {
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub const fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    pub const fn found(&self) -> Option<&Found> {
        match self {
            Self::Found(found) => Some(found),
            _ => None,
        }
    }

    pub const fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Redirect(redirect) => Some(redirect),
            _ => None,
        }
    }

    /// Short label used in logs
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Redirect(_) => "redirect",
            Self::Found(_) => "found",
            Self::NotFound => "not_found",
        }
    }
}
