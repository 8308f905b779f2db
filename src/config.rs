//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Whether the cache runs a background expiry sweeper
    pub background_sweep: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `BACKGROUND_SWEEP` - `true` or `false` (default: true)
    ///
    /// Unparseable values and a zero TTL fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_ms: match env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms) {
                0 => defaults.default_ttl_ms,
                ttl => ttl,
            },
            server_port: env_or("SERVER_PORT", defaults.server_port),
            background_sweep: env_or("BACKGROUND_SWEEP", defaults.background_sweep),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: 300_000,
            server_port: 3000,
            background_sweep: true,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
