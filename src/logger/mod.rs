//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Subscriber setup (stderr or a log file)
//! - Server lifecycle logging
//! - Access logging with multiple formats

mod format;

pub use format::{client_addr, AccessLogEntry};

use crate::config::{Config, LoggingConfig};
use hyper::StatusCode;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global subscriber with configuration
///
/// Should be called once at application startup. `RUST_LOG` takes precedence
/// over `logging.level`. Keep the returned guard alive for as long as log
/// lines must reach the file.
pub fn init(config: &LoggingConfig) -> io::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let Some(log_file) = config.log_file.as_deref() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr).with_target(false))
            .try_init()
            .map_err(io::Error::other)?;
        return Ok(None);
    };

    let path = Path::new(log_file);
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log file '{log_file}' has no file name"),
        )
    })?;
    // Create parent directories if they don't exist
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .map_err(io::Error::other)?;
    Ok(Some(guard))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    info!("Listening on: http://{addr}");
    info!(
        root = %config.spa.root,
        sub_dir = %config.spa.sub_dir,
        mount_prefix = %config.spa.mount_prefix,
        "Serving single-page application"
    );
    if let Some(workers) = config.server.workers {
        info!("Worker threads: {workers}");
    }
    if let Some(max) = config.performance.max_connections {
        info!("Max connections: {max}");
    }
    if let Some(ref path) = config.logging.log_file {
        info!("Log file: {path}");
    }
}

/// Log formatted access log entry
///
/// Server errors are logged at error level and client errors at warn level.
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match StatusCode::from_u16(entry.status) {
        Ok(status) if status.is_server_error() => error!(target: "access", "{line}"),
        Ok(status) if status.is_client_error() => warn!(target: "access", "{line}"),
        _ => info!(target: "access", "{line}"),
    }
}
