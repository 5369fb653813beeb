//! Logging Module
//!
//! Structured logging through `tracing`:
//! - JSON file log, rotated daily, in the data directory's `logs/` folder
//! - Pretty stdout log for operators
//! - `log` crate records bridged into `tracing`

use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file prefix; the appender adds a `.YYYY-MM-DD` suffix
pub const LOG_FILE_PREFIX: &str = "flashgen.log";

/// Filter used when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Directory the file log is written to
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// Initialize the logging system.
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of the
/// application so buffered file logs are flushed on shutdown.
pub fn init(data_dir: &Path) -> WorkerGuard {
    let log_dir = log_dir(data_dir);
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create logs directory {}: {}", log_dir.display(), e);
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter.clone());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .pretty()
        .with_filter(env_filter);

    if let Err(e) = tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
    {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }

    // Usually already done by the subscriber's log bridge
    if let Err(e) = tracing_log::LogTracer::init() {
        log::debug!("LogTracer not installed: {}", e);
    }

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_PREFIX)
    );

    guard
}
