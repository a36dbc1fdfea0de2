use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::{self, LoggingSettings};

/// Route `tracing` output to the log file; the terminal belongs to the UI.
/// `RUST_LOG` overrides `logging.level`.
///
/// Lines are written by a background worker. Keep the returned guard alive
/// until exit so buffered lines are flushed.
pub fn init(
    settings: &LoggingSettings,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    if !settings.enabled {
        return Ok(None);
    }

    let path = settings
        .file
        .clone()
        .or_else(config::default_log_path)
        .ok_or("no log file location")?;
    let dir = path.parent().ok_or("log file has no parent directory")?;
    let name = path.file_name().ok_or("log file has no name")?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| e.to_string())?;
    Ok(Some(guard))
}

#[cfg(test)]
mod tests;
