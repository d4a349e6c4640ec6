use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::utils::error::Result;

/// Installs the global subscriber: a plain-text file layer plus an optional
/// stderr layer. The returned guard must be held until shutdown so buffered
/// lines reach the file.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (directory, file_name) = split_log_path(&config.file);
    if !directory.as_os_str().is_empty() {
        std::fs::create_dir_all(directory)?;
    }

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false);

    let stderr_layer = config
        .stderr
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(guard)
}

fn split_log_path(path: &Path) -> (&Path, &std::ffi::OsStr) {
    let directory = path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("watcher.log"));
    (directory, file_name)
}
