//! Logging for Rivet.
//!
//! The container emits `tracing` events under the `rivet_core` target:
//! resolution entry/exit at TRACE, cache hits and shared registrations at
//! DEBUG. Nothing is printed until a subscriber is installed, either by the
//! host application or through [`LogConfig::init`].
//!
//! # Examples
//!
//! ```no_run
//! use rivet_core::logging::*;
//!
//! let _guard = LogConfig::new()
//!     .level(LogLevel::Debug)
//!     .format(LogFormat::Pretty)
//!     .init()
//!     .expect("log output");
//!
//! info!("container bootstrapped");
//! ```
//!
//! Resolution traces can be switched on without raising the global level:
//!
//! ```no_run
//! use rivet_core::logging::*;
//!
//! let _guard = LogConfig::new()
//!     .level(LogLevel::Warn)
//!     .trace_resolution(true)
//!     .init();
//! ```

use std::io;
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::Directive, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use tracing::{debug, error, info, trace, warn};

/// Filter directive enabling every resolution event of the container
const RESOLUTION_DIRECTIVE: &str = "rivet_core=trace";

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line (default)
    Json,
    Plain,
    Pretty,
    Compact,
}

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Appends to a single file; the directory must exist
    File(PathBuf),
    RollingFile {
        directory: PathBuf,
        prefix: String,
        rotation: Rotation,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Hourly,
    Daily,
    Never,
}

impl From<Rotation> for tracing_appender::rolling::Rotation {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Hourly => Self::HOURLY,
            Rotation::Daily => Self::DAILY,
            Rotation::Never => Self::NEVER,
        }
    }
}

/// Keeps the background writer alive; buffered lines are flushed on drop
#[must_use = "dropping the guard stops the log writer"]
pub struct LogGuard {
    _worker: WorkerGuard,
    installed: bool,
}

impl LogGuard {
    /// False when another global subscriber was already in place
    pub fn is_installed(&self) -> bool {
        self.installed
    }
}

impl std::fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGuard")
            .field("installed", &self.installed)
            .finish()
    }
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Emit every container resolution step regardless of `level`
    pub resolution_trace: bool,
    pub ansi: bool,
    /// Replaces `level` (and `RUST_LOG`) when set
    pub env_filter: Option<String>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn trace_resolution(mut self, enable: bool) -> Self {
        self.resolution_trace = enable;
        self
    }

    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.ansi = enable;
        self
    }

    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.level.as_str());
        let filter = match &self.env_filter {
            Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|_| fallback()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
        };

        match (self.resolution_trace, RESOLUTION_DIRECTIVE.parse::<Directive>()) {
            (true, Ok(directive)) => filter.add_directive(directive),
            _ => filter,
        }
    }

    fn writer(&self) -> io::Result<(NonBlocking, WorkerGuard)> {
        let pair = match &self.output {
            LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
            LogOutput::File(path) => {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                tracing_appender::non_blocking(file)
            }
            LogOutput::RollingFile {
                directory,
                prefix,
                rotation,
            } => tracing_appender::non_blocking(tracing_appender::rolling::RollingFileAppender::new(
                (*rotation).into(),
                directory,
                prefix,
            )),
        };
        Ok(pair)
    }

    fn layer(&self, writer: NonBlocking) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = fmt::layer().with_writer(writer).with_ansi(self.ansi);
        match self.format {
            LogFormat::Json => layer.json().with_current_span(true).boxed(),
            LogFormat::Plain => layer.boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
        }
    }

    /// Install the global subscriber.
    ///
    /// Fails only when the output cannot be opened. If another subscriber is
    /// already installed it stays in place; see [`LogGuard::is_installed`].
    pub fn init(self) -> io::Result<LogGuard> {
        let (writer, worker) = self.writer()?;
        let installed = tracing_subscriber::registry()
            .with(self.layer(writer))
            .with(self.filter())
            .try_init()
            .is_ok();

        if !installed {
            debug!("global tracing subscriber already installed; keeping it");
        }
        Ok(LogGuard {
            _worker: worker,
            installed,
        })
    }
}

impl Default for LogConfig {
    /// JSON to STDOUT at INFO
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            output: LogOutput::Stdout,
            resolution_trace: false,
            ansi: false,
            env_filter: None,
        }
    }
}
