//! Cache capability interface
//!
//! The operations every cache backend exposes. Backends implement the
//! single-key primitives; the batch forms and `get_or_default` are built on
//! top of them here so every backend shares the same batch semantics.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use super::errors::CacheError;

/// A key/value cache backend
///
/// Object safe: callers select a backend at construction time and hold it as
/// `Box<dyn Cacher>` or `Arc<dyn Cacher>`.
pub trait Cacher: Send + Sync {
    /// Get the value stored under `key`
    ///
    /// Returns [`CacheError::NotFound`] if nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Vec<u8>, CacheError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Store `value` under `key` and record an expiry `ttl` from now
    fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    /// Whether a value is stored under `key`
    fn has(&self, key: &str) -> bool;

    /// Remove the value stored under `key`
    ///
    /// Returns [`CacheError::NotFound`] if nothing is stored under `key`.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every stored value
    fn clear(&self) -> Result<(), CacheError>;

    /// Get the value stored under `key`, or `default` on any failure
    fn get_or_default(&self, key: &str, default: Vec<u8>) -> Vec<u8> {
        self.get(key).unwrap_or(default)
    }

    /// Get every key in `keys` that has a value
    ///
    /// Keys with nothing stored are left out of the result. Any other
    /// failure aborts the batch and is returned wrapped with the failing key.
    fn get_multiple(&self, keys: &[&str]) -> Result<HashMap<String, Vec<u8>>, CacheError> {
        let mut values = HashMap::with_capacity(keys.len());
        for &key in keys {
            match self.get(key) {
                Ok(value) => {
                    values.insert(key.to_string(), value);
                }
                Err(CacheError::NotFound) => {
                    debug!(key = key, "Skipping missing key in batch get");
                }
                Err(e) => return Err(CacheError::batch(key, e)),
            }
        }
        Ok(values)
    }

    /// Store every pair in `values`
    ///
    /// Not transactional: stops at the first failure, returning it wrapped
    /// with the failing key. Pairs written before the failure stay written
    /// and pairs after it are not attempted. Iteration order is unspecified.
    fn set_multiple(&self, values: &HashMap<String, Vec<u8>>) -> Result<(), CacheError> {
        for (key, value) in values {
            self.set(key, value)
                .map_err(|e| CacheError::batch(key, e))?;
        }
        Ok(())
    }

    /// Remove every key in `keys`, in order
    ///
    /// Not transactional: stops at the first failure (including a missing
    /// key), returning it wrapped with the failing key. Keys removed before
    /// the failure stay removed.
    fn delete_multiple(&self, keys: &[&str]) -> Result<(), CacheError> {
        for &key in keys {
            self.delete(key).map_err(|e| CacheError::batch(key, e))?;
        }
        Ok(())
    }
}
