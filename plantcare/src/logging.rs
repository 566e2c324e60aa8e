//! Tracing subscriber setup for applications embedding the engine.
//!
//! The engine itself only emits `tracing` events. Application shells call
//! [`init_logging`] once at startup to route them to stderr or a file.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Errors that can occur when installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log file path has no parent directory or file name.
    #[error("invalid log file path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Builds the level filter. `RUST_LOG` takes precedence over `level`.
#[must_use]
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Installs the global tracing subscriber.
///
/// With a log file configured, output goes through a non-blocking file
/// appender and the returned [`WorkerGuard`] must be held until shutdown
/// so buffered entries are flushed. Without one, output goes to stderr
/// and no guard is returned.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidPath`] for an unusable file path, or
/// [`LoggingError::Install`] if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = env_filter(&config.level);

    let Some(log_path) = config.file.as_deref() else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| LoggingError::Install(e.to_string()))?;
        return Ok(None);
    };

    let invalid = || LoggingError::InvalidPath(log_path.to_path_buf());
    let log_dir = log_path.parent().ok_or_else(invalid)?;
    let file_name = log_path.file_name().ok_or_else(invalid)?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;

    Ok(Some(guard))
}
