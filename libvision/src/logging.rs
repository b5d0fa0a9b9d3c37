//! Shared logging setup for the Vision binaries
//!
//! Every binary logs through `tracing` to stderr. The output format and the
//! level come from CLI flags first, then from `VISION_LOG_FORMAT` /
//! `VISION_LOG_LEVEL`, then from the defaults (text, `info`). `RUST_LOG`
//! overrides the level filter entirely when set.
//!
//! # Examples
//!
//! ```no_run
//! use libvision::logging::{LoggingConfig, LogFormat};
//!
//! // JSON lines for the preview server behind a log collector
//! LoggingConfig::new(LogFormat::Json, "info".to_string(), false).init();
//!
//! // Or resolve everything from the environment
//! libvision::logging::init_default();
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "VISION_LOG_FORMAT";

/// Environment variable selecting the minimum level
pub const LOG_LEVEL_ENV: &str = "VISION_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output (no colors, for piping)
    Text,
    /// Machine-parseable JSON (one JSON object per line)
    Json,
    /// Pretty-printed with colors (for development)
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LoggingConfig {
    /// Create a new logging configuration
    ///
    /// * `format` - Log output format (text, json, or pretty)
    /// * `level` - Minimum log level (error, warn, info, debug, trace)
    /// * `verbose` - Forces `debug` and turns on per-request HTTP traces
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Resolve a configuration from CLI values, falling back to the environment
    pub fn resolve(format: Option<LogFormat>, verbose: bool) -> Self {
        let format = format
            .or_else(|| std::env::var(LOG_FORMAT_ENV).ok().and_then(|s| s.parse().ok()))
            .unwrap_or(LogFormat::Text);
        let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
        Self::new(format, level, verbose)
    }

    /// The filter directives this configuration asks for
    ///
    /// Verbose mode also enables `tower_http` request spans, which are
    /// otherwise too chatty for a public site.
    pub fn directives(&self) -> String {
        if self.verbose {
            "debug,tower_http=debug".to_string()
        } else {
            format!("{},tower_http=warn", self.level)
        }
    }

    /// Initialize logging with the configured settings
    ///
    /// Call once at the start of the program. A second call is logged and
    /// otherwise ignored.
    pub fn init(&self) {
        if let Err(e) = self.try_init() {
            tracing::debug!("Logging already initialized: {}", e);
        }
    }

    /// Initialize logging, reporting failure if a subscriber is already set
    pub fn try_init(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()));

        match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .flatten_event(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .try_init(),
        }
    }
}

/// Initialize logging from `VISION_LOG_FORMAT` and `VISION_LOG_LEVEL`
///
/// Falls back to text format with info level if not set.
///
/// ```bash
/// export VISION_LOG_FORMAT=json
/// export VISION_LOG_LEVEL=debug
/// vision-serve --preview
/// ```
pub fn init_default() {
    LoggingConfig::resolve(None, false).init();
}
