//! Logger module
//!
//! Provides logging utilities for the accounts server including:
//! - Server lifecycle logging
//! - Per-request method/status lines and access logging
//! - Error and warning logging with a level filter
//! - File-based logging support

mod format;
mod level;
pub mod writer;

pub use format::AccessLogEntry;
pub use level::LogLevel;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    let level = config
        .level
        .parse::<LogLevel>()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    writer::init(
        level,
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

fn write(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        // Before init (and in tests) fall back to the standard streams
        None => match level {
            LogLevel::Error | LogLevel::Warn => eprintln!("{message}"),
            LogLevel::Info => println!("{message}"),
            LogLevel::Debug => {}
        },
    }
}

fn write_info(message: &str) {
    write(LogLevel::Info, message);
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Accounts server started successfully");
    write_info(&format!("Listening on: http://{addr}{}", config.api.base_path));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        write_info(&format!("Max connections: {max}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    if config.api.silent_missing_param {
        write_info("Missing account_id answered with empty 200 (legacy mode)");
    }
    write_info("======================================\n");
}

/// `discarded` is the number of records still held, if any
pub fn log_shutdown(discarded: Option<usize>) {
    match discarded {
        Some(records) => write_info(&format!(
            "[Shutdown] Server stopped, discarding {records} in-memory account record(s)"
        )),
        None => write_info("[Shutdown] Server stopped"),
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write(LogLevel::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_request_method(method: &hyper::Method) {
    write_info(&format!("[Request] received: {method}"));
}

pub fn log_response_status(status: u16) {
    write_info(&format!("[Response] returned: {status}"));
}

pub fn log_debug(message: &str) {
    write(LogLevel::Debug, &format!("[DEBUG] {message}"));
}

pub fn log_error(message: &str) {
    write(LogLevel::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write(LogLevel::Warn, &format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}
