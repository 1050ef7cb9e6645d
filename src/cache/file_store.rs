//! Filesystem Store
//!
//! Stores each key as one file directly under a root directory. The file
//! holds a JSON envelope with the value and optional expiry metadata.
//! Nothing is kept in memory: the directory contents are the whole state.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, trace, warn};

use super::cacher::Cacher;
use super::entry::CacheEntry;
use super::errors::CacheError;

/// Prefix of the temp files used for atomic writes
const TEMP_PREFIX: &str = ".filecache-";

/// Suffix of the temp files used for atomic writes
const TEMP_SUFFIX: &str = ".tmp";

/// Suffix of the staging directory kept next to the root
const STAGING_SUFFIX: &str = ".staging";

/// Mode requested for entry files, before the process umask
#[cfg(unix)]
const ENTRY_MODE: u32 = 0o666;

/// Filesystem-backed cache
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Absolute root directory holding one file per key
    root: PathBuf,
    /// Sibling of `root` where writes are staged before being renamed into
    /// place; outside the key namespace
    staging: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`
    ///
    /// The path is made absolute and the directory (with parents) is created
    /// if missing; opening an existing directory is fine. Temp files left in
    /// the staging directory by interrupted writes are swept.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, CacheError> {
        let requested = root.as_ref();
        let root = std::path::absolute(requested).map_err(|source| CacheError::CreateRoot {
            path: requested.to_path_buf(),
            source,
        })?;

        fs::create_dir_all(&root).map_err(|source| CacheError::CreateRoot {
            path: root.clone(),
            source,
        })?;

        let staging = staging_dir(&root);
        fs::create_dir_all(&staging).map_err(|source| CacheError::CreateRoot {
            path: staging.clone(),
            source,
        })?;

        let store = Self { root, staging };
        store.cleanup();

        info!(root = %store.root.display(), "File store opened");

        Ok(store)
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the full envelope stored under `key`, including expiry metadata
    pub fn entry(&self, key: &str) -> Result<CacheEntry, CacheError> {
        let data = self.read(key)?;
        CacheEntry::from_bytes(&data).map_err(|source| CacheError::Decode {
            key: key.to_string(),
            source,
        })
    }

    /// Read the raw bytes of a key's file
    fn read(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        // A missing root counts as a miss, same as a missing key
        fs::metadata(&self.root).map_err(|e| not_found_or_io(key, e))?;

        let data = fs::read(self.path_for(key)).map_err(|e| not_found_or_io(key, e))?;
        trace!(key = key, size = data.len(), "File store HIT");
        Ok(data)
    }

    /// Encode `entry` and write it over the key's file
    fn write(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let data = entry.to_bytes().map_err(|source| CacheError::Encode {
            key: key.to_string(),
            source,
        })?;

        // Writes never recreate a cleared root
        fs::metadata(&self.root).map_err(|e| CacheError::io(key, e))?;

        fs::create_dir_all(&self.staging).map_err(|e| CacheError::io(key, e))?;

        // Write atomically using tempfile
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(ENTRY_MODE));
        }
        let mut tmp = builder
            .tempfile_in(&self.staging)
            .map_err(|e| CacheError::io(key, e))?;

        tmp.write_all(&data).map_err(|e| CacheError::io(key, e))?;

        tmp.persist(self.path_for(key))
            .map_err(|e| CacheError::io(key, e.error))?;

        debug!(
            key = key,
            size = entry.value.len(),
            expires_at = ?entry.expires_at,
            "Stored entry"
        );

        Ok(())
    }

    /// Clean up temp files left behind by interrupted writes
    ///
    /// Only the staging directory is scanned, so no key is ever touched.
    /// Best effort: failures are logged and otherwise ignored.
    fn cleanup(&self) {
        let read_dir = match fs::read_dir(&self.staging) {
            Ok(read_dir) => read_dir,
            Err(e) => {
                warn!(staging = %self.staging.display(), error = %e, "Could not scan for stale temp files");
                return;
            }
        };

        for entry in read_dir.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX) {
                let path = entry.path();
                debug!(path = %path.display(), "Removing stale temp file");
                if let Err(e) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "Failed to remove stale temp file");
                }
            }
        }
    }

    /// Convert a key to its file path
    ///
    /// Keys are not escaped: separators inside a key address nested paths.
    /// A leading separator is dropped so the key stays under the root.
    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches(['/', '\\']))
    }
}

/// Staging directory for `root`: `<root>.staging`, on the same filesystem
fn staging_dir(root: &Path) -> PathBuf {
    match root.file_name() {
        Some(name) => {
            let mut name = name.to_os_string();
            name.push(STAGING_SUFFIX);
            root.with_file_name(name)
        }
        None => root.join(format!("{}staging", TEMP_PREFIX)),
    }
}

/// Map a missing file to a miss, anything else to an I/O error for `key`
fn not_found_or_io(key: &str, e: io::Error) -> CacheError {
    if e.kind() == io::ErrorKind::NotFound {
        CacheError::NotFound
    } else {
        CacheError::io(key, e)
    }
}

impl Cacher for FileStore {
    fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        match self.entry(key) {
            Ok(entry) => Ok(entry.value),
            Err(CacheError::NotFound) => {
                debug!(key = key, "File store MISS");
                Err(CacheError::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.write(key, &CacheEntry::new(value.to_vec()))
    }

    fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        self.write(key, &CacheEntry::with_ttl(value.to_vec(), ttl, Utc::now()))
    }

    fn has(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        fs::remove_file(self.path_for(key)).map_err(|e| not_found_or_io(key, e))?;
        debug!(key = key, "Deleted entry");
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(CacheError::Io {
                    key: self.root.display().to_string(),
                    source: e,
                })
            }
        }
        if let Err(e) = fs::remove_dir_all(&self.staging) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(staging = %self.staging.display(), error = %e, "Failed to remove staging directory");
            }
        }
        info!(root = %self.root.display(), "Cleared file store");
        Ok(())
    }
}
