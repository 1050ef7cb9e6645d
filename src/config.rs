//! Store configuration
//!
//! The only setting is the root directory. It comes from `FILECACHE_DIR` or,
//! failing that, a `filecache` directory under the platform cache dir.

use std::env;
use std::path::PathBuf;

use crate::cache::{CacheError, FileStore};

/// Environment variable overriding the root directory
pub const ROOT_ENV_VAR: &str = "FILECACHE_DIR";

/// Directory name used under the platform cache dir
const DEFAULT_DIR_NAME: &str = "filecache";

/// Configuration for opening a [`FileStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Root directory for cached entries
    pub root: PathBuf,
}

impl StoreConfig {
    /// Config with an explicit root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Config from the environment, falling back to the platform default
    pub fn from_env() -> Self {
        Self::from_override(env::var_os(ROOT_ENV_VAR).map(PathBuf::from))
    }

    fn from_override(root: Option<PathBuf>) -> Self {
        match root {
            Some(root) if !root.as_os_str().is_empty() => Self::new(root),
            _ => Self::default(),
        }
    }

    /// Open the store this config describes
    pub fn open(&self) -> Result<FileStore, CacheError> {
        FileStore::open(&self.root)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let root = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(DEFAULT_DIR_NAME);
        Self { root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cacher;
    use tempfile::TempDir;

    #[test]
    fn test_default_root() {
        let config = StoreConfig::default();
        assert!(config.root.ends_with(DEFAULT_DIR_NAME));
    }

    #[test]
    fn test_override() {
        let config = StoreConfig::from_override(Some(PathBuf::from("/srv/cache")));
        assert_eq!(config.root, PathBuf::from("/srv/cache"));

        // Empty value means unset
        let config = StoreConfig::from_override(Some(PathBuf::new()));
        assert_eq!(config, StoreConfig::default());

        assert_eq!(StoreConfig::from_override(None), StoreConfig::default());
    }

    #[test]
    fn test_open() {
        let dir = TempDir::new().unwrap();
        let store = StoreConfig::new(dir.path().join("store")).open().unwrap();

        store.set("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap(), b"v");
    }
}
