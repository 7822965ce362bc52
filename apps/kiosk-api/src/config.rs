//! Kiosk API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use kiosk_core::LifecyclePolicy;

/// Kiosk API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Interface to bind
    pub bind_addr: IpAddr,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// Seconds after creation at which an order becomes read-only
    pub lock_after_secs: u64,

    /// Seconds after creation at which an order is deleted on access
    pub expire_after_secs: u64,

    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
}

impl KioskConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = KioskConfig {
            http_port: var("KIOSK_HTTP_PORT", "8787")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KIOSK_HTTP_PORT".to_string()))?,

            bind_addr: var("KIOSK_BIND_ADDR", "0.0.0.0")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KIOSK_BIND_ADDR".to_string()))?,

            database_path: var("KIOSK_DATABASE_PATH", "./kiosk.db"),

            db_max_connections: var("KIOSK_DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KIOSK_DB_MAX_CONNECTIONS".to_string()))?,

            lock_after_secs: var("KIOSK_LOCK_AFTER_SECS", "14400") // 4 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KIOSK_LOCK_AFTER_SECS".to_string()))?,

            expire_after_secs: var("KIOSK_EXPIRE_AFTER_SECS", "86400") // 24 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KIOSK_EXPIRE_AFTER_SECS".to_string()))?,

            log_level: var("KIOSK_LOG", "info"),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "KIOSK_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        // Fail at startup rather than on the first order
        config.lifecycle_policy()?;

        Ok(config)
    }

    /// Address to listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }

    /// Lock and expiry offsets for new orders.
    pub fn lifecycle_policy(&self) -> Result<LifecyclePolicy, ConfigError> {
        LifecyclePolicy::new(
            Duration::from_secs(self.lock_after_secs),
            Duration::from_secs(self.expire_after_secs),
        )
        .map_err(|e| ConfigError::InvalidLifecycle(e.to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid order lifecycle: {0}")]
    InvalidLifecycle(String),
}
