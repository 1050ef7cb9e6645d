//! Cache Error Types
//!
//! Every failure a cache backend can report. A miss is its own variant so
//! callers can tell it apart from real storage failures.

use std::path::PathBuf;

/// Cache error types
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("data not found")]
    NotFound,

    #[error("{key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{key}: malformed entry: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{key}: failed to encode entry: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{key}: {source}")]
    Batch {
        key: String,
        #[source]
        source: Box<CacheError>,
    },

    #[error("cannot use cache root {path:?}: {source}")]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        CacheError::Io {
            key: key.to_string(),
            source,
        }
    }

    /// Wrap an error raised while processing `key` inside a batch operation
    pub(crate) fn batch(key: &str, source: CacheError) -> Self {
        CacheError::Batch {
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    /// Whether this error means the key (or the root directory) was absent,
    /// looking through any batch wrapper
    pub fn is_not_found(&self) -> bool {
        match self {
            CacheError::NotFound => true,
            CacheError::Batch { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Key the error was raised for, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            CacheError::NotFound | CacheError::CreateRoot { .. } => None,
            CacheError::Io { key, .. }
            | CacheError::Decode { key, .. }
            | CacheError::Encode { key, .. }
            | CacheError::Batch { key, .. } => Some(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_not_found_through_batch() {
        let err = CacheError::batch("a", CacheError::NotFound);
        assert!(err.is_not_found());
        assert_eq!(err.key(), Some("a"));
        assert_eq!(err.to_string(), "a: data not found");
    }

    #[test]
    fn test_io_error_carries_key() {
        let source = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = CacheError::io("abc", source);
        assert!(!err.is_not_found());
        assert_eq!(err.key(), Some("abc"));
        assert_eq!(err.to_string(), "abc: denied");
    }

    #[test]
    fn test_not_found_has_no_key() {
        assert_eq!(CacheError::NotFound.key(), None);
    }
}
