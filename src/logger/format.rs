//! Resolution log format module
//!
//! Supports multiple log formats:
//! - `text` (one human-readable line)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use crate::resolver::Resolution;
use chrono::Local;
use std::time::Duration;

/// One resolved request, ready to be written to the resolution log
#[derive(Debug, Clone)]
pub struct ResolutionLogEntry {
    /// Resolution timestamp
    pub time: chrono::DateTime<Local>,
    /// Request path as given
    pub path: String,
    /// Outcome label (found, redirect, not_found)
    pub outcome: &'static str,
    /// Redirect location or matched file
    pub target: Option<String>,
    /// Parameters as `name=value`, in discovery order
    pub params: Vec<String>,
    /// Matched extensions
    pub extensions: Vec<String>,
    /// Time spent resolving in microseconds
    pub elapsed_us: u64,
}

impl ResolutionLogEntry {
    /// Create a new entry with current timestamp
    pub fn new(path: String, resolution: &Resolution, elapsed: Duration) -> Self {
        let (target, params, extensions) = match resolution {
            Resolution::Redirect(redirect) => (Some(redirect.location.clone()), vec![], vec![]),
            Resolution::Found(found) => (
                Some(
                    found
                        .file_path
                        .with_file_name(&found.filename)
                        .display()
                        .to_string(),
                ),
                found
                    .params
                    .iter()
                    .map(|p| format!("{}={}", p.name, p.value))
                    .collect(),
                found.extensions.clone(),
            ),
            Resolution::NotFound => (None, vec![], vec![]),
        };

        Self {
            time: Local::now(),
            path,
            outcome: resolution.label(),
            target,
            params,
            extensions,
            elapsed_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "text" => self.format_text(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    /// `[$time_local] $outcome $path -> $target [$params] ($elapsed us)`
    fn format_text(&self) -> String {
        let mut line = format!(
            "[{}] {} {}",
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.outcome,
            self.path
        );
        if let Some(target) = &self.target {
            line.push_str(&format!(" -> {target}"));
        }
        if !self.params.is_empty() {
            line.push_str(&format!(" [{}]", self.params.join(", ")));
        }
        line.push_str(&format!(" ({}us)", self.elapsed_us));
        line
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "time": self.time.to_rfc3339(),
            "path": self.path,
            "outcome": self.outcome,
            "target": self.target,
            "params": self.params,
            "extensions": self.extensions,
            "elapsed_us": self.elapsed_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$time_local` - Local time in Common Log Format
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$path` - Request path
    /// - `$outcome` - found, redirect or `not_found`
    /// - `$target` - Redirect location or matched file (`-` when none)
    /// - `$params` - Comma separated `name=value` pairs
    /// - `$extensions` - Comma separated matched extensions
    /// - `$elapsed` - Resolution time in microseconds
    ///
    /// Substitution is a single pass: text inserted for one variable is never
    /// scanned again, so a `$` inside a request path stays literal.
    fn format_custom(&self, pattern: &str) -> String {
        let mut result = String::with_capacity(pattern.len() * 2);
        let mut rest = pattern;

        while let Some(at) = rest.find('$') {
            result.push_str(&rest[..at]);
            let tail = &rest[at + 1..];
            match CUSTOM_VARIABLES.iter().find(|name| tail.starts_with(**name)) {
                Some(name) => {
                    result.push_str(&self.variable(name));
                    rest = &tail[name.len()..];
                }
                None => {
                    result.push('$');
                    rest = tail;
                }
            }
        }
        result.push_str(rest);
        result
    }

    fn variable(&self, name: &str) -> String {
        match name {
            "time_local" => self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            "time_iso8601" => self.time.to_rfc3339(),
            "path" => self.path.clone(),
            "outcome" => self.outcome.to_string(),
            "target" => self.target.clone().unwrap_or_else(|| "-".to_string()),
            "params" => self.params.join(","),
            "extensions" => self.extensions.join(","),
            "elapsed" => self.elapsed_us.to_string(),
            _ => String::new(),
        }
    }
}

/// Variables recognized in custom patterns, none a prefix of another
const CUSTOM_VARIABLES: [&str; 8] = [
    "time_local",
    "time_iso8601",
    "path",
    "outcome",
    "target",
    "params",
    "extensions",
    "elapsed",
];
