//! Logging for the formcheck crates.
//!
//! Validation runs on every request, so logging is off the hot path unless
//! asked for: records below the global level are dropped before the message
//! is formatted.
//!
//! # Usage
//!
//! ```rust
//! use formcheck_log::{debug, warn};
//!
//! let field = "email";
//! debug!("checking field {}", field);
//! warn!(target: "formcheck::file", "cannot sniff upload for {}", field);
//! ```
//!
//! # Environment Variables
//!
//! - `FORMCHECK_DEBUG=1` - Enable debug logging
//! - `FORMCHECK_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `FORMCHECK_LOG_FORMAT=json|compact|facade` - Set output format
//!
//! The `facade` format hands every record to the [`log`] crate, so an
//! application that already installed a logger receives formcheck output
//! through it.

use once_cell::sync::Lazy;
use std::env;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Levels
// ============================================================================

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Disables all output
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }

    /// Matching `log` crate level; `None` for `Off`.
    fn to_facade(self) -> Option<log::Level> {
        match self {
            Level::Trace => Some(log::Level::Trace),
            Level::Debug => Some(log::Level::Debug),
            Level::Info => Some(log::Level::Info),
            Level::Warn => Some(log::Level::Warn),
            Level::Error => Some(log::Level::Error),
            Level::Off => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Output format
// ============================================================================

/// Where and how records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One JSON object per line on stderr
    Json,
    /// `HH:MM:SS L target: message` on stderr
    Compact,
    /// Forward to the `log` crate
    Facade,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "compact" => Some(Format::Compact),
            "facade" | "log" => Some(Format::Facade),
            _ => None,
        }
    }
}

// ============================================================================
// Global state
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration read once from the environment.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
        }
    }
}

impl LogConfig {
    /// Build the configuration from `FORMCHECK_*` variables and publish the
    /// resulting level to the global filter.
    pub fn from_env() -> Self {
        let debug = env::var("FORMCHECK_DEBUG")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        let level = env::var("FORMCHECK_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = env::var("FORMCHECK_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Json);

        DEBUG_ENABLED.store(debug, Ordering::SeqCst);
        LOG_LEVEL.store(level as u8, Ordering::SeqCst);

        Self {
            debug,
            level,
            format,
        }
    }
}

fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

// ============================================================================
// Public API
// ============================================================================

/// Read the environment now instead of on the first record.
pub fn init() {
    Lazy::force(&CONFIG);
}

#[inline]
pub fn is_debug_enabled() -> bool {
    Lazy::force(&CONFIG);
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    Lazy::force(&CONFIG);
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

pub fn current_level() -> Level {
    Lazy::force(&CONFIG);
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

pub fn set_level(level: Level) {
    Lazy::force(&CONFIG);
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Toggle debug mode; enabling it lowers the level to `Debug` if needed.
pub fn set_debug(enabled: bool) {
    Lazy::force(&CONFIG);
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Output
// ============================================================================

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    let config = config();
    let debug_override = level == Level::Debug && is_debug_enabled();
    if !debug_override && !is_level_enabled(level) {
        return;
    }

    match config.format {
        Format::Json => write_json(level, target, message),
        Format::Compact => write_compact(level, target, message),
        Format::Facade => {
            if let Some(facade) = level.to_facade() {
                log::log!(target: target, facade, "{}", message);
            }
        }
    }
}

fn write_compact(level: Level, target: &str, message: &str) {
    let mut stderr = std::io::stderr().lock();
    let now = chrono::Local::now();
    let initial = level.as_str().chars().next().unwrap_or('?');
    let _ = writeln!(
        stderr,
        "{} {} {}: {}",
        now.format("%H:%M:%S"),
        initial,
        target,
        message
    );
}

#[cfg(feature = "json")]
fn write_json(level: Level, target: &str, message: &str) {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Record<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let record = Record {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
    };

    if let Ok(line) = serde_json::to_string(&record) {
        eprintln!("{}", line);
    }
}

#[cfg(not(feature = "json"))]
fn write_json(level: Level, target: &str, message: &str) {
    write_compact(level, target, message)
}

// ============================================================================
// Macros
// ============================================================================

/// Log at trace level.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log at debug level. Also emitted when `FORMCHECK_DEBUG=1`.
///
/// ```rust
/// use formcheck_log::debug;
///
/// let field = "stars";
/// debug!("checking field {}", field);
/// debug!(target: "formcheck::checker", "{} rules", 2);
/// ```
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_debug_enabled() || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log at info level.
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log at warn level.
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log at error level.
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, module_path!(), &format!($($arg)+));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("debug"), Some(Level::Debug));
        assert_eq!(Level::parse(" WARNING "), Some(Level::Warn));
        assert_eq!(Level::parse("none"), Some(Level::Off));
        assert_eq!(Level::parse("verbose"), None);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("json"), Some(Format::Json));
        assert_eq!(Format::parse("Compact"), Some(Format::Compact));
        assert_eq!(Format::parse("log"), Some(Format::Facade));
        assert_eq!(Format::parse("pretty"), None);
    }

    // Both cases share the global level, so they run in one test.
    #[test]
    fn test_runtime_overrides() {
        let original_level = current_level();
        let original_debug = is_debug_enabled();

        set_level(Level::Trace);
        assert!(!is_level_enabled(Level::Off));
        assert!(is_level_enabled(Level::Trace));

        set_debug(false);
        set_level(Level::Error);
        assert!(!is_level_enabled(Level::Warn));
        set_debug(true);
        assert!(is_debug_enabled());
        assert_eq!(current_level(), Level::Debug);

        set_debug(original_debug);
        set_level(original_level);
    }

    #[test]
    fn test_macros_expand() {
        let field = "email";
        trace!("trace {}", field);
        debug!("debug {}", field);
        info!(target: "formcheck::test", "info");
        warn!(target: "formcheck::test", "warn {}", 1);
        error!("error");
    }
}
