use crate::error::ChatdigestError;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const LOG_FILE_NAME: &str = "chatdigest.log";

/// Initialize logging system
///
/// Sets up logging to both console and file
///
/// # Arguments
/// * `log_dir` - Directory where log files will be stored
/// * `log_level` - Log level (trace, debug, info, warn, error)
pub fn setup_logging(log_dir: &Path, log_level: &str) -> Result<(), ChatdigestError> {
    let (log_file, log_file_path) = open_log_file(log_dir)?;

    // Environment filter setup (RUST_LOG env var takes precedence)
    let env_filter = build_filter(log_level);

    // Console output layer
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter.clone());

    // File output layer
    let file_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false) // Remove ANSI color codes in files
        .with_span_events(FmtSpan::FULL)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ChatdigestError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!("Logging initialized: level={}, log_file={}", log_level, log_file_path.display());

    Ok(())
}

/// File-only logging
///
/// For the summarizer and model listing commands: stdout and stderr are
/// read by the calling process, so nothing may be logged there.
pub fn setup_file_logging(log_dir: &Path, log_level: &str) -> Result<(), ChatdigestError> {
    let (log_file, log_file_path) = open_log_file(log_dir)?;

    tracing_subscriber::fmt()
        .with_writer(Arc::new(log_file))
        .with_target(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_env_filter(build_filter(log_level))
        .try_init()
        .map_err(|e| ChatdigestError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!("File logging initialized: level={}, log_file={}", log_level, log_file_path.display());

    Ok(())
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(parse_log_level(log_level).to_string()))
}

fn open_log_file(log_dir: &Path) -> Result<(File, std::path::PathBuf), ChatdigestError> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir).map_err(|e| {
            ChatdigestError::config(format!(
                "Failed to create log directory {}: {}",
                log_dir.display(),
                e
            ))
        })?;
    }

    let log_file_path = log_dir.join(LOG_FILE_NAME);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .map_err(|e| {
            ChatdigestError::config(format!(
                "Failed to open log file {}: {}",
                log_file_path.display(),
                e
            ))
        })?;

    Ok((log_file, log_file_path))
}

/// Parse string to tracing Level
pub fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
