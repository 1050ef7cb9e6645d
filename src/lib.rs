//! filecache - filesystem-backed key/value cache
//!
//! Stores one JSON envelope per key under a root directory and exposes it
//! through the [`Cacher`] capability interface shared by cache backends.

pub mod cache;
pub mod config;

pub use cache::{CacheEntry, CacheError, Cacher, FileStore};
pub use config::StoreConfig;
