//! Logger module
//!
//! Provides logging utilities for the resolver including:
//! - Startup logging
//! - Resolution logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::ResolutionLogEntry;

use crate::config::Config;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::OnceLock;

/// Log verbosity, lowest is most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl Level {
    pub fn parse(level: &str) -> Option<Self> {
        match level.to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" | "trace" => Some(Self::Debug),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Error,
            1 => Self::Warn,
            2 => Self::Info,
            _ => Self::Debug,
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(Level::Warn as u8);
static RESOLVE_LOG: AtomicBool = AtomicBool::new(false);
static RESOLVE_LOG_FORMAT: OnceLock<String> = OnceLock::new();

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = Level::parse(&config.logging.level).unwrap_or_else(|| {
        log_warning(&format!(
            "Unknown log level '{}', using info",
            config.logging.level
        ));
        Level::Info
    });
    set_level(level);
    RESOLVE_LOG.store(config.logging.resolve_log, Ordering::Relaxed);
    // Only the first init takes effect; writer::init below reports a repeat
    let _ = RESOLVE_LOG_FORMAT.set(config.logging.resolve_log_format.clone());

    writer::init(
        config.logging.resolve_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

pub fn set_level(level: Level) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn level() -> Level {
    Level::from_u8(LEVEL.load(Ordering::Relaxed))
}

pub fn enabled(level: Level) -> bool {
    level <= self::level()
}

/// Write to info/resolution log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => eprintln!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to resolution log specifically
fn write_resolve(message: &str) {
    match writer::get() {
        Some(w) => w.write_resolve(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_startup(config: &Config) {
    if !enabled(Level::Info) {
        return;
    }
    write_info("======================================");
    write_info("fsroute resolver ready");
    write_info(&format!("Base directory: {}", config.resolver.base_dir));
    write_info(&format!(
        "Extensions: {}",
        config.resolver.extensions.join(", ")
    ));
    write_info(&format!(
        "Default pages: {}",
        config.resolver.default_pages.join(", ")
    ));
    write_info(&format!(
        "Squash default page: {}",
        config.resolver.squash_default_page
    ));
    write_info(&format!("Log level: {}", level().as_str()));
    if let Some(ref path) = config.logging.resolve_log_file {
        write_info(&format!("Resolve log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

/// Log formatted resolution entry
pub fn log_resolution(entry: &ResolutionLogEntry) {
    if !RESOLVE_LOG.load(Ordering::Relaxed) || !enabled(Level::Info) {
        return;
    }
    let format = RESOLVE_LOG_FORMAT.get().map_or("text", String::as_str);
    write_resolve(&entry.format(format));
}

pub fn log_rule_fired(rule: &str, working: &[String]) {
    if enabled(Level::Debug) {
        log_debug(&format!("rule {rule} at /{}", working.join("/")));
    }
}

pub fn log_blocked_segment(base: &Path, segment: &str) {
    log_warning(&format!(
        "Path traversal attempt blocked: segment {segment:?} under {}",
        base.display()
    ));
}

pub fn log_error(message: &str) {
    if enabled(Level::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}
