// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub logging: LoggingConfig,
}

/// Resolver configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResolverConfig {
    /// Directory the request paths are resolved against
    pub base_dir: String,
    /// Accepted file extensions, most preferred first
    pub extensions: Vec<String>,
    /// Names standing for a directory's own page
    pub default_pages: Vec<String>,
    /// Redirect literal default page segments to their directory
    pub squash_default_page: bool,
    /// Extension of template files (e.g. "hbs")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_extension: Option<String>,
    /// Prefix applied to redirect locations
    #[serde(default)]
    pub redirect_base: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// Write one line per resolved path
    pub resolve_log: bool,
    /// Resolution log format (text, json, or custom pattern)
    #[serde(default = "default_resolve_log_format")]
    pub resolve_log_format: String,
    /// Resolution log file path (optional, stdout if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_resolve_log_format() -> String {
    "text".to_string()
}
