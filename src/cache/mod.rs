//! Cache Module
//!
//! Interchangeable key-value storage backends behind one contract:
//! in-process memory, a filesystem directory, and a remote cache server.

mod backend;
mod clock;
mod codec;
mod entry;
mod file;
mod memory;
mod network;
mod stats;


// Re-export public types
pub use backend::{open_backend, BackendConfig, Connector, StorageBackend, TypedStorage};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{decode, encode};
pub use entry::CacheEntry;
pub use file::{FileBackend, FileConfig, DEFAULT_PREFIX};
pub use memory::MemoryBackend;
pub use network::{CacheClient, NetworkBackend, NetworkConfig, DEFAULT_SERVER};
pub use stats::{CacheStats, Diagnostics, ErrorHook};
