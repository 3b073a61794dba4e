//! File logging for the hook.
//!
//! stdout carries status lines for the editor, so logs go to
//! `~/.zeedas/zeedas-hook.log` through a non-blocking writer.

use fs_err as fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use zeedas_core::StorageConfig;

/// Installs the global subscriber. The returned guard must live until exit or
/// buffered lines are lost.
pub fn init(storage: &StorageConfig, debug: bool) -> Option<WorkerGuard> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let log_path = storage.log_file();
    let directory = log_path.parent()?;
    let file_name = log_path.file_name()?;
    if let Err(e) = fs::create_dir_all(directory) {
        eprintln!("zeedas-hook: cannot create log directory: {}", e);
        return None;
    }

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}
