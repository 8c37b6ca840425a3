//! Logging Infrastructure
//!
//! `tracing` subscriber with an env filter, optional JSON lines and optional
//! daily rolling files.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` takes precedence over `log_level`. File output is used only
/// when `log_dir` exists or can be created.
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = json.unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if std::fs::create_dir_all(log_path).is_ok() {
            let file_appender = tracing_appender::rolling::daily(log_path, "cemac-pos");
            let builder = builder.with_ansi(false).with_writer(file_appender);
            let result = if json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            if result.is_err() {
                tracing::debug!("Logger already initialized");
            }
            return;
        }
    }

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("Logger already initialized");
    }
}
