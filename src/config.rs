//! Configuration management for the secrets probe.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `8080`.
//! - `WEB_ROOT` - Optional. Web root holding the `secrets/` mount. Defaults to `./wwwroot`.

use std::path::PathBuf;
use thiserror::Error;

use crate::probe::{lookup, EnvSource, ProcessEnv};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Web root directory; the secret driver mounts into `<web_root>/secrets`
    pub web_root: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let host = lookup(env, "HOST", "0.0.0.0");

        let port = lookup(env, "PORT", "8080")
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let web_root = env.var("WEB_ROOT").map(PathBuf::from).unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("wwwroot")
        });

        Ok(Self {
            host,
            port,
            web_root,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(web_root: PathBuf) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            web_root,
        }
    }

    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
