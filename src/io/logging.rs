use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured log filter
pub const LOG_ENV: &str = "WORKLOG_LOG";

/// Install a file-backed tracing subscriber. The terminal belongs to the TUI,
/// so nothing is written to stdout or stderr.
///
/// The returned guard flushes the background writer on drop; keep it alive
/// for the whole session.
pub fn init_logging(log_file: &Path, default_level: &str) -> std::io::Result<WorkerGuard> {
    let dir = log_file.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let file_name = log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "worklog.log".into());

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init();

    Ok(guard)
}
