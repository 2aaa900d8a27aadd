//! Runtime configuration
//!
//! Read once from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default directory for the client bundle
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Sessions idle longer than this are removed
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How often the idle sweep runs
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A connection must finish its request head within this window
pub const HEADER_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Config {
    /// `host:port` to listen on
    pub bind_addr: String,
    /// Directory served for plain HTTP requests
    pub static_dir: PathBuf,
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
    /// Connections that stay silent this long are dropped
    pub header_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            idle_timeout: SESSION_IDLE_TIMEOUT,
            sweep_interval: SWEEP_INTERVAL,
            header_timeout: HEADER_TIMEOUT,
        }
    }
}

impl Config {
    /// Build from `PORT`, `HOST` and `STATIC_DIR`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT must be a port number, got '{}'", raw)))?,
            None => DEFAULT_PORT,
        };
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let static_dir = lookup("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

        Ok(Self {
            bind_addr: format!("{}:{}", host, port),
            static_dir: PathBuf::from(static_dir),
            ..Self::default()
        })
    }

    /// Replace the bind address, e.g. from the command line
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }
}
