use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "askaway.log";
const DEFAULT_FILTER: &str = "askaway=info,askaway_core=info";

/// Send tracing output to `<log_dir>/askaway.log`.
///
/// The terminal belongs to the TUI, so nothing is written to stdout or
/// stderr. Keep the returned guard alive until exit or buffered lines
/// are lost.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(guard)
}

/// Like `init_logging`, but a missing or unusable log directory only
/// prints a warning and the program carries on without a log file.
pub fn try_init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let log_dir = log_dir?;
    match init_logging(log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{} logging disabled: {:#}", "warning:".yellow(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logs_land_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let guard = init_logging(&log_dir).unwrap();
        tracing::info!(target: "askaway", "hello from the test");
        drop(guard);

        let contents = std::fs::read_to_string(log_dir.join(LOG_FILE)).unwrap();
        assert!(contents.contains("hello from the test"));
    }

    #[test]
    fn test_unusable_log_dir_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "").unwrap();

        // A regular file in the path means the directory can never be created
        assert!(init_logging(&file.join("logs")).is_err());
        assert!(try_init_logging(Some(&file.join("logs"))).is_none());
        assert!(try_init_logging(None).is_none());
    }
}
