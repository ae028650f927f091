//! Request path tokenizer
//!
//! Turns a request path into the segment list the resolver walks:
//!
//! ```text
//! /                              => [""]
//! /folder1/folder2/              => ["folder1", "folder2", ""]
//! /folder1/folder2/file          => ["folder1", "folder2", "file"]
//! /folder1/:key1/folder2/file    => ["folder1", ":key1", "folder2", "file"]
//! ```

use percent_encoding::percent_decode_str;
use std::sync::OnceLock;
use url::Url;

/// Input accepted by the resolver
///
/// A URL string is normalized and split; a pre-split list is used as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPath {
    Url(String),
    Segments(Vec<String>),
}

impl RequestPath {
    pub fn into_segments(self) -> Vec<String> {
        match self {
            Self::Url(url) => tokenize(&url),
            Self::Segments(segments) => segments,
        }
    }
}

impl From<&str> for RequestPath {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for RequestPath {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<&String> for RequestPath {
    fn from(url: &String) -> Self {
        Self::Url(url.clone())
    }
}

impl From<Vec<String>> for RequestPath {
    fn from(segments: Vec<String>) -> Self {
        Self::Segments(segments)
    }
}

impl From<Vec<&str>> for RequestPath {
    fn from(segments: Vec<&str>) -> Self {
        Self::Segments(segments.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for RequestPath {
    fn from(segments: &[&str]) -> Self {
        Self::Segments(segments.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Normalize a URL path
///
/// Drops any query string or fragment, collapses repeated slashes and
/// resolves `.` and `..` (a `..` never climbs above the root). Characters
/// that need escaping are percent-encoded and escaped unreserved characters
/// are decoded, so `/dir%31/a%20b` becomes `/dir1/a%20b`. A trailing slash
/// (or a trailing dot segment) is kept as a trailing slash.
pub fn normalize(url: &str) -> String {
    let collapsed = collapse_slashes(url);
    let base = BASE.get_or_init(|| Url::parse("http://localhost/").ok());

    let joined = base.as_ref().and_then(|base| base.join(&collapsed).ok());
    match joined {
        Some(parsed) => decode_unreserved(parsed.path()),
        // Unparseable input still gets its query and fragment dropped
        None => collapsed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

static BASE: OnceLock<Option<Url>> = OnceLock::new();

/// Root-anchor `url` and fold runs of `/` or `\` into one `/`
///
/// Keeps a leading `//` from being read as an authority.
fn collapse_slashes(url: &str) -> String {
    let mut collapsed = String::with_capacity(url.len() + 1);
    collapsed.push('/');
    for c in url.chars() {
        let c = if c == '\\' { '/' } else { c };
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed
}

/// Decode `%XX` escapes of unreserved characters (`A-Z a-z 0-9 - . _ ~`)
///
/// Every other escape is kept, so `%2F` never turns into a separator and
/// parameter values keep their encoding.
fn decode_unreserved(path: &str) -> String {
    let mut decoded = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(at) = rest.find('%') {
        decoded.push_str(&rest[..at]);
        let escape = rest.get(at..at + 3).unwrap_or(&rest[at..]);
        let byte = match percent_decode_str(escape).collect::<Vec<u8>>().as_slice() {
            [byte] if escape.len() == 3 => Some(*byte),
            _ => None,
        };
        match byte {
            Some(b) if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') => {
                decoded.push(char::from(b));
                rest = &rest[at + 3..];
            }
            _ => {
                decoded.push('%');
                rest = &rest[at + 1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

/// Split a URL into resolver segments
pub fn tokenize(url: &str) -> Vec<String> {
    let normalized = normalize(url);
    let mut segments: Vec<String> = normalized.split('/').map(String::from).collect();

    // The empty segment before the first slash denotes the root, not a name
    if normalized.starts_with('/') {
        segments.remove(0);
    }

    if segments.is_empty() {
        segments.push(String::new());
    }

    segments
}
