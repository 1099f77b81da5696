//! Logging setup.
//!
//! Events go to two places: stderr (human-readable, colored) and a log file
//! in the configured directory (plain text, written by a background thread).
//! `RUST_LOG` overrides the configured level.

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// Name of the log file inside the log directory.
pub const LOG_FILE_NAME: &str = "fieldscope.log";

const TIMESTAMP_FORMAT: &str =
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]";

/// Errors during logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log filter '{0}'")]
    Filter(String),

    #[error("Invalid timestamp format: {0}")]
    Format(String),

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Keeps the file writer alive. Dropping it flushes pending log lines.
#[must_use = "logs are lost when the guard is dropped"]
pub struct LoggingGuard {
    _file: WorkerGuard,
    log_path: PathBuf,
}

impl LoggingGuard {
    /// Path of the active log file.
    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }
}

/// Build the filter: `RUST_LOG` when set, the configured level otherwise.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|_| LoggingError::Filter(level.to_string())),
    }
}

/// Install the global subscriber.
///
/// Call once at startup and hold the returned guard until exit.
pub fn init_logging(settings: &LoggingSettings) -> Result<LoggingGuard, LoggingError> {
    std::fs::create_dir_all(&settings.directory).map_err(|source| LoggingError::Directory {
        path: settings.directory.clone(),
        source,
    })?;

    let format = time::format_description::parse(TIMESTAMP_FORMAT)
        .map_err(|e| LoggingError::Format(e.to_string()))?;
    let timer = LocalTime::new(format);

    let appender = tracing_appender::rolling::never(&settings.directory, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_timer(timer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(build_filter(&settings.level)?)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard {
        _file: guard,
        log_path: settings.directory.join(LOG_FILE_NAME),
    })
}
