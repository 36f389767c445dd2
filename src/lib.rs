//! Cache Backends - pluggable key-value cache storage
//!
//! One synchronous contract ([`cache::StorageBackend`]) over interchangeable
//! backends: in-process memory, a filesystem directory, and a remote cache
//! server client. Expiry is time-based and backend-local; failures are
//! absorbed and reported through diagnostics rather than returned.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{StorageBackend, TypedStorage};
pub use config::Config;
