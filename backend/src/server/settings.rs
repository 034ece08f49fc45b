//! Process settings loaded via OrthoConfig.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Settings read from `CORRIDOR_*` variables, config files and flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CORRIDOR")]
pub struct CorridorSettings {
    /// Socket address the HTTP listener binds.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; without one the registry lives in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub db_pool_size: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub db_connect_timeout_secs: Option<u64>,
    /// Login name of the central user created on first start.
    pub bootstrap_username: Option<String>,
    /// Display name of the bootstrap user.
    pub bootstrap_full_name: Option<String>,
    /// Initial password of the bootstrap user.
    pub bootstrap_password: Option<String>,
}

/// Credentials for the first central administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapUser<'a> {
    pub username: &'a str,
    pub full_name: &'a str,
    pub password: &'a str,
}

impl CorridorSettings {
    /// Listener address, falling back to all interfaces on port 8080.
    ///
    /// # Errors
    /// Returns [`AddrParseError`] when the configured address is malformed.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR).parse()
    }

    /// Pool size, defaulting to ten connections.
    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Pool checkout timeout.
    pub fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.db_connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Bootstrap credentials when both username and password are set.
    pub fn bootstrap_user(&self) -> Option<BootstrapUser<'_>> {
        let username = self.bootstrap_username.as_deref()?;
        let password = self.bootstrap_password.as_deref()?;
        Some(BootstrapUser {
            username,
            full_name: self.bootstrap_full_name.as_deref().unwrap_or(username),
            password,
        })
    }
}
