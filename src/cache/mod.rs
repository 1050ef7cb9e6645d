//! Cache backends
//!
//! The `Cacher` capability interface and its filesystem implementation.

pub mod cacher;
pub mod entry;
pub mod errors;
pub mod file_store;

pub use cacher::Cacher;
pub use entry::CacheEntry;
pub use errors::CacheError;
pub use file_store::FileStore;
