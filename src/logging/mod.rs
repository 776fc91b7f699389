//! Logging for the Sui DAO SDK
//!
//! A single `tracing` subscriber is installed per process. Console output
//! goes to stderr so command output on stdout stays machine readable; an
//! optional daily-rolling file under `~/.suidao/logs` receives the same
//! events without ANSI colors.
//!
//! ```rust,no_run
//! use sui_dao_rs::logging::{init_logging, LogFormat, LoggingConfig};
//! use sui_dao_rs::dao_info;
//!
//! init_logging(&LoggingConfig::new().with_debug(true).with_format(LogFormat::Compact));
//! dao_info!(dao_id = "0x1234567890abcdef", "DAO selected");
//! ```

pub mod format;

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::expand_home;
use crate::core::constants::DEFAULT_LOGGING_DIR;

pub use format::{CompactFormatter, DaoFormatter, JsonFormatter};

/// File name prefix of the rolling log file
pub const LOG_FILE_NAME: &str = "suidao.log";

static INIT: Once = Once::new();

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Keeps the non-blocking file writer flushing for the life of the process
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `HH:MM:SS.mmm LEVEL target: message key=value`
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// `LEVEL message`
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Compact => write!(f, "compact"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!(
                "Invalid log format '{}'. Valid options: text, json, compact",
                s
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level DEBUG
    pub debug: bool,
    /// Minimum level TRACE (wins over `debug`)
    pub trace: bool,
    /// Only warnings and errors; ignored when `debug` or `trace` is set
    #[serde(default)]
    pub quiet: bool,
    /// Also write to a rolling file in `logging_dir`
    pub record_log: bool,
    /// Supports a leading `~/`
    pub logging_dir: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            trace: false,
            quiet: false,
            record_log: false,
            logging_dir: DEFAULT_LOGGING_DIR.to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_file_logging(mut self, enabled: bool) -> Self {
        self.record_log = enabled;
        self
    }

    pub fn with_logging_dir(mut self, dir: impl Into<String>) -> Self {
        self.logging_dir = dir.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Load configuration from environment variables
    ///
    /// - `SUIDAO_DEBUG` / `SUIDAO_TRACE`: raise the level (any value)
    /// - `SUIDAO_LOG_FORMAT`: text, json or compact
    /// - `SUIDAO_LOG_DIR`: enable file logging into this directory
    /// - `RUST_LOG`: full filter directive, wins over everything above
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.debug = std::env::var("SUIDAO_DEBUG").is_ok();
        config.trace = std::env::var("SUIDAO_TRACE").is_ok();

        if let Ok(format) = std::env::var("SUIDAO_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                config.format = f;
            }
        }

        if let Ok(dir) = std::env::var("SUIDAO_LOG_DIR") {
            config.logging_dir = dir;
            config.record_log = true;
        }

        config
    }

    fn level(&self) -> Level {
        if self.trace {
            Level::TRACE
        } else if self.debug {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }

    fn log_dir(&self) -> PathBuf {
        expand_home(&self.logging_dir)
    }

    fn filter(&self) -> EnvFilter {
        if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!(
                "{},hyper=warn,hyper_util=warn,reqwest=warn,h2=warn",
                self.level()
            ))
        }
    }
}

/// Install the global subscriber. Only the first call has any effect.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        install(config);
        INITIALIZED.store(true, Ordering::SeqCst);
    });
}

/// Text format at INFO, console only
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

fn file_writer(config: &LoggingConfig) -> Option<NonBlocking> {
    if !config.record_log {
        return None;
    }
    let dir = config.log_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Warning: cannot create log directory {:?}: {}", dir, e);
        return None;
    }
    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);
    Some(writer)
}

fn console_layer(format: LogFormat) -> BoxedLayer {
    let layer = fmt::layer().with_writer(io::stderr);
    match format {
        LogFormat::Text => layer.event_format(DaoFormatter).boxed(),
        LogFormat::Json => layer.event_format(JsonFormatter).with_ansi(false).boxed(),
        LogFormat::Compact => layer.event_format(CompactFormatter).boxed(),
    }
}

fn file_layer(format: LogFormat, writer: NonBlocking) -> BoxedLayer {
    let layer = fmt::layer().with_writer(writer).with_ansi(false);
    match format {
        LogFormat::Json => layer.event_format(JsonFormatter).boxed(),
        LogFormat::Compact => layer.event_format(CompactFormatter).boxed(),
        LogFormat::Text => layer.event_format(DaoFormatter).boxed(),
    }
}

fn install(config: &LoggingConfig) {
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.format)];
    if let Some(writer) = file_writer(config) {
        layers.push(file_layer(config.format, writer));
    }

    let result = tracing_subscriber::registry()
        .with(layers)
        .with(config.filter())
        .try_init();
    if let Err(e) = result {
        eprintln!("Warning: logging already configured: {}", e);
    }
}

/// Log a debug message.
///
/// ```rust,ignore
/// dao_debug!(proposal_id = %id, "Recomputing active proposals");
/// ```
#[macro_export]
macro_rules! dao_debug {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

/// Log an info message.
#[macro_export]
macro_rules! dao_info {
    ($($arg:tt)*) => {
        tracing::info!($($arg)*)
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! dao_warn {
    ($($arg:tt)*) => {
        tracing::warn!($($arg)*)
    };
}

/// Log an error message.
///
/// ```rust,ignore
/// dao_error!(error = %e, "Vote could not be recorded");
/// ```
#[macro_export]
macro_rules! dao_error {
    ($($arg:tt)*) => {
        tracing::error!($($arg)*)
    };
}

/// Log a trace message.
#[macro_export]
macro_rules! dao_trace {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}
