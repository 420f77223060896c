//! Configuration for the travel CMS backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared admin key for write endpoints (required in production)
    pub admin_key: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Per-request deadline applied at the router boundary
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_key = env::var("TOURCMS_ADMIN_KEY").ok();

        let db_path = env::var("TOURCMS_DB_PATH")
            .unwrap_or_else(|_| "./data/tourcms.sqlite".to_string())
            .into();

        let bind_addr = env::var("TOURCMS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid TOURCMS_BIND_ADDR format");

        let log_level = env::var("TOURCMS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let timeout_secs = env::var("TOURCMS_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Self {
            admin_key,
            db_path,
            bind_addr,
            log_level,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        env::remove_var("TOURCMS_ADMIN_KEY");
        env::remove_var("TOURCMS_DB_PATH");
        env::remove_var("TOURCMS_BIND_ADDR");
        env::remove_var("TOURCMS_LOG_LEVEL");
        env::remove_var("TOURCMS_REQUEST_TIMEOUT_SECS");

        let config = Config::from_env();

        assert!(config.admin_key.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/tourcms.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
