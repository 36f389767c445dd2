//! Network Backend Module
//!
//! Thin adapter over a remote cache server client. Expiry and flush are the
//! server's native operations; server selection across the configured
//! endpoints is left to the client.
//!
//! Known limitation: the remote protocol cannot tell "absent" from "empty",
//! so an empty payload reads as a miss. `contains` is therefore an
//! approximation built on `get`, not an existence guarantee.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{Diagnostics, StorageBackend};
use crate::error::{CacheError, Result};

/// Endpoint used when no servers are configured.
pub const DEFAULT_SERVER: &str = "127.0.0.1:11211";

// == Cache Client ==
/// Operations the wrapped remote cache client must provide.
pub trait CacheClient: Send + Sync {
    /// Stores `value` under `key`; a `ttl` of 0 means no expiry.
    fn set(&self, key: &str, value: &[u8], ttl: u64) -> Result<()>;

    /// Fetches the value for `key`, None when the server has nothing.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Removes `key` on the server.
    fn delete(&self, key: &str) -> Result<()>;

    /// Drops every key on every server.
    fn flush_all(&self) -> Result<()>;

    /// Closes all pooled connections.
    fn disconnect_all(&self) -> Result<()>;
}

impl<C: CacheClient + ?Sized> CacheClient for Box<C> {
    fn set(&self, key: &str, value: &[u8], ttl: u64) -> Result<()> {
        (**self).set(key, value, ttl)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn flush_all(&self) -> Result<()> {
        (**self).flush_all()
    }

    fn disconnect_all(&self) -> Result<()> {
        (**self).disconnect_all()
    }
}

impl<C: CacheClient + ?Sized> CacheClient for Arc<C> {
    fn set(&self, key: &str, value: &[u8], ttl: u64) -> Result<()> {
        (**self).set(key, value, ttl)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn flush_all(&self) -> Result<()> {
        (**self).flush_all()
    }

    fn disconnect_all(&self) -> Result<()> {
        (**self).disconnect_all()
    }
}

// == Network Config ==
/// Options for [`NetworkBackend`]. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Ordered `host:port` endpoints handed to the client
    pub servers: Vec<String>,
}

impl NetworkConfig {
    /// Creates a config for the given endpoints.
    pub fn new<I, S>(servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            servers: servers.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks every endpoint is `host:port` with a numeric port.
    pub fn validate(&self) -> Result<()> {
        if self.servers.is_empty() {
            return Err(CacheError::Config("no cache servers configured".to_string()));
        }
        for server in &self.servers {
            let valid = server
                .rsplit_once(':')
                .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
            if !valid {
                return Err(CacheError::Config(format!(
                    "invalid server address '{}', expected host:port",
                    server
                )));
            }
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            servers: vec![DEFAULT_SERVER.to_string()],
        }
    }
}

// == Network Backend ==
/// Cache storage delegated to a remote cache server.
pub struct NetworkBackend<C> {
    config: NetworkConfig,
    client: C,
    diagnostics: Diagnostics,
}

impl<C: CacheClient> NetworkBackend<C> {
    // == Constructor ==
    /// Wraps an already connected client.
    pub fn with_client(config: NetworkConfig, client: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client,
            diagnostics: Diagnostics::new(),
        })
    }

    /// Validates `config` and builds the client through `connector`.
    pub fn connect<F>(config: NetworkConfig, connector: F) -> Result<Self>
    where
        F: FnOnce(&NetworkConfig) -> Result<C>,
    {
        config.validate()?;
        let client = connector(&config)?;
        info!(servers = config.servers.len(), "network cache client connected");
        Self::with_client(config, client)
    }

    /// Replaces the diagnostics, e.g. to install an error hook.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Returns the wrapped client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: CacheClient> StorageBackend for NetworkBackend<C> {
    fn set(&self, key: &str, value: Vec<u8>, ttl: u64) {
        if self
            .diagnostics
            .absorb("set", key, self.client.set(key, &value, ttl))
            .is_some()
        {
            debug!(key, ttl, "network cache set");
        }
    }

    /// Empty payloads read as absent.
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let value = self
            .diagnostics
            .absorb("get", key, self.client.get(key))
            .flatten()
            .filter(|value| !value.is_empty());
        self.diagnostics.record_lookup(&value);
        value
    }

    fn delete(&self, key: &str) {
        self.diagnostics.absorb("delete", key, self.client.delete(key));
    }

    /// Approximated with a read; see the module docs.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn expired(&self, key: &str) -> bool {
        !self.contains(key)
    }

    fn flush(&self) -> bool {
        self.diagnostics
            .absorb("flush", "*", self.client.flush_all())
            .is_some()
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn close(&self) -> bool {
        let closed = self
            .diagnostics
            .absorb("close", "*", self.client.disconnect_all())
            .is_some();
        if closed {
            info!(servers = self.config.servers.len(), "network cache client disconnected");
        }
        closed
    }
}

impl<C> fmt::Debug for NetworkBackend<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkBackend")
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl<C> fmt::Display for NetworkBackend<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<NetworkBackend servers:{}>", self.config.servers.len())
    }
}
