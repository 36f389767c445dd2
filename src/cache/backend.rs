//! Storage Backend Module
//!
//! The uniform contract every cache backend implements, the typed layer on
//! top of it, and construction-time backend selection.
//!
//! All operations are fail-open: I/O, client and serialization failures are
//! absorbed at the backend boundary. A write that fails is a no-op and a read
//! that fails looks like a miss, so callers cannot tell "never cached" from
//! "cache is broken". Failures stay observable through [`Diagnostics`].

use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::cache::codec;
use crate::cache::file::{FileBackend, FileConfig};
use crate::cache::memory::MemoryBackend;
use crate::cache::network::{CacheClient, NetworkBackend, NetworkConfig};
use crate::cache::Diagnostics;
use crate::error::{CacheError, Result};

// == Storage Backend Trait ==
/// One storage strategy behind the uniform cache contract.
pub trait StorageBackend: Send + Sync + fmt::Debug + fmt::Display {
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// A `ttl` of 0 means the entry never expires.
    fn set(&self, key: &str, value: Vec<u8>, ttl: u64);

    /// Returns the live value for `key`, or None if absent or expired.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str);

    /// Whether `key` has an entry, as far as this backend can tell.
    fn contains(&self, key: &str) -> bool;

    /// Whether `key` has an entry whose expiry has passed.
    fn expired(&self, key: &str) -> bool;

    /// Removes every entry this backend can enumerate.
    fn flush(&self) -> bool;

    /// Counters and error hook for this backend.
    fn diagnostics(&self) -> &Diagnostics;

    /// Returns the live value for `key`, or `default`.
    fn get_or(&self, key: &str, default: Vec<u8>) -> Vec<u8> {
        self.get(key).unwrap_or(default)
    }

    /// Releases held resources. Local backends have none.
    fn close(&self) -> bool {
        true
    }
}

// == Typed Storage ==
/// Serde-typed access on top of any [`StorageBackend`].
pub trait TypedStorage: StorageBackend {
    /// Encodes and stores `value`. Encoding failures make this a no-op.
    fn set_value<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: u64) {
        if let Some(bytes) = self.diagnostics().absorb("encode", key, codec::encode(value)) {
            self.set(key, bytes, ttl);
        }
    }

    /// Reads and decodes the value for `key`. Undecodable payloads read as absent.
    fn get_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key)?;
        self.diagnostics().absorb("decode", key, codec::decode(&bytes))
    }

    /// Reads and decodes the value for `key`, or returns `default`.
    fn get_value_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_value(key).unwrap_or(default)
    }
}

impl<B: StorageBackend + ?Sized> TypedStorage for B {}

// == Backend Configuration ==
/// Selects and configures one backend kind.
///
/// Deserializes from a mapping tagged with `kind`; unrecognized option keys
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    #[default]
    Memory,
    File(FileConfig),
    Network(NetworkConfig),
}

/// Builds the client for a network backend from its configuration.
pub type Connector = dyn Fn(&NetworkConfig) -> Result<Box<dyn CacheClient>> + Send + Sync;

// == Factory ==
/// Constructs the backend described by `config`.
///
/// The network backend needs a `connector` to build its client; configuration
/// errors surface here rather than on first use.
pub fn open_backend(
    config: &BackendConfig,
    connector: Option<&Connector>,
) -> Result<Arc<dyn StorageBackend>> {
    let backend: Arc<dyn StorageBackend> = match config {
        BackendConfig::Memory => Arc::new(MemoryBackend::new()),
        BackendConfig::File(file) => Arc::new(FileBackend::new(file.clone())),
        BackendConfig::Network(network) => {
            let connector = connector.ok_or_else(|| {
                CacheError::Config("network backend requires a client connector".to_string())
            })?;
            Arc::new(NetworkBackend::connect(network.clone(), connector)?)
        }
    };
    info!(backend = %backend, "cache backend opened");
    Ok(backend)
}
