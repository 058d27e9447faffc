//! Logging and tracing configuration
//!
//! The library only emits `tracing` events. Binaries and tests decide where
//! they go by initializing a subscriber through [`LoggingConfig`].

use std::fmt;
use std::io;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self as tracing_fmt, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Error returned when the global subscriber cannot be installed
pub type LoggingInitError = Box<dyn std::error::Error + Send + Sync>;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the application
    pub level: Level,
    /// Whether to enable JSON formatting
    pub json_format: bool,
    /// Whether to log to file
    pub log_to_file: bool,
    /// Log file directory (if logging to file)
    pub log_directory: Option<String>,
    /// Log file prefix (if logging to file)
    pub log_file_prefix: String,
    /// Whether to enable span events
    pub enable_span_events: bool,
    /// Whether to enable ansi colors in console output
    pub enable_ansi: bool,
    /// Custom environment filter
    pub env_filter: Option<String>,
}

/// Keeps the non-blocking writers alive
///
/// Buffered log lines are flushed when the guard is dropped, so hold it
/// until the end of `main`.
#[must_use = "dropping the guard stops buffered log output"]
pub struct LoggingGuard {
    guards: Vec<WorkerGuard>,
}

impl LoggingGuard {
    /// Number of background writers held open
    pub fn writer_count(&self) -> usize {
        self.guards.len()
    }
}

impl fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingGuard").field("writers", &self.guards.len()).finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            log_to_file: false,
            log_directory: None,
            log_file_prefix: "queue-kpi-simulator".to_string(),
            enable_span_events: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON formatting
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable file logging
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_to_file = true;
        self.log_directory = Some(directory.into());
        self
    }

    /// Set log file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn build_filter(&self) -> Result<EnvFilter, LoggingInitError> {
        if let Some(filter) = &self.env_filter {
            return Ok(EnvFilter::try_new(filter)?);
        }
        Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                self.level
            ))
        }))
    }

    /// Install the global tracing subscriber
    ///
    /// Fails instead of panicking when a subscriber is already installed.
    pub fn init(self) -> Result<LoggingGuard, LoggingInitError> {
        let registry = Registry::default().with(self.build_filter()?);
        let mut guards = Vec::new();

        let (console_writer, console_guard) = non_blocking(io::stderr());
        guards.push(console_guard);

        let console_json = self.json_format.then(|| {
            tracing_fmt::layer()
                .json()
                .with_writer(console_writer.clone())
                .with_span_events(self.span_events())
        });
        let console_pretty = (!self.json_format).then(|| {
            tracing_fmt::layer()
                .pretty()
                .with_writer(console_writer)
                .with_ansi(self.enable_ansi)
                .with_span_events(self.span_events())
        });

        // Files always get JSON lines
        let file_layer = if self.log_to_file {
            let log_dir = self.log_directory.as_deref().unwrap_or("logs");
            let (file_writer, file_guard) =
                non_blocking(rolling::daily(log_dir, &self.log_file_prefix));
            guards.push(file_guard);
            Some(
                tracing_fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(file_writer)
                    .with_span_events(self.span_events()),
            )
        } else {
            None
        };

        registry.with(console_json).with(console_pretty).with(file_layer).try_init()?;

        info!(
            level = %self.level,
            json = self.json_format,
            file = self.log_to_file,
            "Logging initialized"
        );
        Ok(LoggingGuard { guards })
    }

    /// Initialize logging for development (pretty console output)
    pub fn init_dev() -> Result<LoggingGuard, LoggingInitError> {
        Self::new().with_level(Level::DEBUG).with_span_events().init()
    }

    /// Initialize logging for production (JSON format with file logging)
    pub fn init_prod(log_dir: impl Into<String>) -> Result<LoggingGuard, LoggingInitError> {
        Self::new()
            .with_level(Level::INFO)
            .with_json_format()
            .with_file_logging(log_dir)
            .without_ansi()
            .init()
    }

    /// Initialize logging for testing (minimal output)
    pub fn init_test() -> Result<LoggingGuard, LoggingInitError> {
        Self::new().with_level(Level::WARN).without_ansi().init()
    }

    /// Initialize verbose logging (INFO level with span events)
    pub fn init_verbose() -> Result<LoggingGuard, LoggingInitError> {
        Self::new().with_level(Level::INFO).with_span_events().init()
    }

    /// Initialize debug logging (DEBUG level with span events)
    pub fn init_debug() -> Result<LoggingGuard, LoggingInitError> {
        Self::new().with_level(Level::DEBUG).with_span_events().init()
    }
}

/// Emit a structured event tagged as coming from a queue discipline
#[macro_export]
macro_rules! queue_event {
    ($level:ident, $message:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::$level!(
            message = $message,
            component = "queue",
            $($key = $value,)*
        );
    };
    ($level:ident, $message:expr) => {
        tracing::$level!(
            message = $message,
            component = "queue",
        );
    };
}

/// Open a span around a measured stretch of work
#[macro_export]
macro_rules! perf_span {
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info_span!(
            $name,
            component = "performance",
            $($key = $value,)*
        )
    };
    ($name:expr) => {
        tracing::info_span!(
            $name,
            component = "performance",
        )
    };
}
