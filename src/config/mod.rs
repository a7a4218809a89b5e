// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig};

use crate::logger::LogLevel;

/// Environment variable prefix, e.g. `ACCOUNTS_SERVER__PORT=9000`
const ENV_PREFIX: &str = "ACCOUNTS";

impl Config {
    /// Load configuration from specified file path (extension optional).
    ///
    /// The file is optional; environment variables override it and built-in
    /// defaults fill whatever neither provides.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", types::DEFAULT_HOST)?
            .set_default("server.port", types::DEFAULT_PORT)?
            .set_default("logging.level", types::DEFAULT_LOG_LEVEL)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", types::DEFAULT_ACCESS_LOG_FORMAT)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", types::DEFAULT_READ_TIMEOUT)?
            .set_default("performance.write_timeout", types::DEFAULT_WRITE_TIMEOUT)?
            .set_default("http.server_name", types::DEFAULT_SERVER_NAME)?
            .set_default("http.max_body_size", types::DEFAULT_MAX_BODY_SIZE)?
            .set_default("http.body_read_timeout_ms", types::DEFAULT_BODY_READ_TIMEOUT_MS)?
            .set_default("api.base_path", types::DEFAULT_BASE_PATH)?
            .set_default("api.silent_missing_param", false)?
            .build()?;

        settings.try_deserialize()
    }

    /// Reject values that would only fail later at bind or request time
    pub fn validate(&self) -> Result<(), String> {
        self.get_socket_addr()?;

        if !self.api.base_path.starts_with('/') {
            return Err(format!(
                "api.base_path must start with '/': {}",
                self.api.base_path
            ));
        }

        if self.logging.level.parse::<LogLevel>().is_err() {
            return Err(format!("Unknown logging.level: {}", self.logging.level));
        }

        if self.http.max_body_size == 0 {
            return Err("http.max_body_size must be greater than zero".to_string());
        }

        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
