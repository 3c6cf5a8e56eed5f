//! Logging setup
//!
//! Library code only emits `tracing` events. Binaries pick a sink here:
//! a daily-rotated file under `logs/`, or stderr for one-shot CLI runs.
//! `RUST_LOG` overrides the default `info` filter.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Directory used by `init_logging`
pub const LOG_DIR: &str = "logs";

/// File name prefix for rotated log files
pub const LOG_FILE_PREFIX: &str = "shadow-policy.log";

const DEFAULT_FILTER: &str = "info";

/// Output format for file logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Log to a daily file in `logs/`
///
/// Keep the returned guard alive for the life of the program; dropping it
/// flushes and stops the background writer.
pub fn init_logging() -> anyhow::Result<WorkerGuard> {
    init_logging_in(LOG_DIR, LogFormat::Text)
}

/// Log to a daily file in `dir`
pub fn init_logging_in(dir: impl AsRef<Path>, format: LogFormat) -> anyhow::Result<WorkerGuard> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = match format {
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Logging to {}", dir.display());
    Ok(guard)
}

/// Log to stderr, for CLI use
pub fn init_logging_to_stderr() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
