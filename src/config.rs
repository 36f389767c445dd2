//! Configuration Module
//!
//! Loads the demo server's configuration from environment variables. The
//! library backends themselves take typed config structs.

use std::env;
use std::path::PathBuf;

use crate::cache::{BackendConfig, FileConfig};
use crate::error::{CacheError, Result};

/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend served over HTTP
    pub backend: BackendConfig,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `memory` or `file` (default: memory)
    /// - `CACHE_DIR` - File backend directory (default: system temp dir)
    /// - `CACHE_PREFIX` - File backend file name prefix (default: cache)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Result<Self> {
        let backend = match env::var("CACHE_BACKEND").ok().as_deref() {
            None | Some("memory") => BackendConfig::Memory,
            Some("file") => {
                let mut file = FileConfig::default();
                if let Ok(dir) = env::var("CACHE_DIR") {
                    file.dir = PathBuf::from(dir);
                }
                if let Ok(prefix) = env::var("CACHE_PREFIX") {
                    file.prefix = prefix;
                }
                BackendConfig::File(file)
            }
            Some(other) => {
                return Err(CacheError::Config(format!(
                    "unsupported CACHE_BACKEND '{}', expected memory or file",
                    other
                )))
            }
        };

        Ok(Self {
            backend,
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Memory,
            server_port: 3000,
        }
    }
}
