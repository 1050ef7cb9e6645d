//! On-disk envelope
//!
//! Each key's file holds one JSON object `{"Val": ..., "TTL": ...}`: the raw
//! value as standard base64 and an optional RFC 3339 expiry timestamp.

use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Serialize bytes as a base64 string.
fn serialize_base64<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(value))
}

/// Deserialize bytes from a base64 string. `null` is read as an empty value,
/// which is how a nil byte slice is written by other envelope writers.
fn deserialize_base64<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    let encoded: Option<String> = Option::deserialize(deserializer)?;
    match encoded {
        Some(s) => base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(de::Error::custom),
        None => Ok(Vec::new()),
    }
}

/// Seconds since the epoch of 9999-12-31T23:59:59Z
const LATEST_EXPIRY_SECS: i64 = 253_402_300_799;

/// Latest expiry that still serializes as plain RFC 3339
fn latest_expiry() -> DateTime<Utc> {
    DateTime::from_timestamp(LATEST_EXPIRY_SECS, 999_999_999).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A cached value plus optional expiry metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached payload
    #[serde(
        rename = "Val",
        default,
        serialize_with = "serialize_base64",
        deserialize_with = "deserialize_base64"
    )]
    pub value: Vec<u8>,
    /// When the entry expires (None = no expiry recorded)
    #[serde(rename = "TTL", default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Entry with no expiry
    pub fn new(value: Vec<u8>) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Entry that expires `ttl` after `now`
    ///
    /// Expiries are clamped to `9999-12-31T23:59:59.999999999Z`, the last
    /// instant with a four-digit RFC 3339 year.
    pub fn with_ttl(value: Vec<u8>, ttl: Duration, now: DateTime<Utc>) -> Self {
        let latest = latest_expiry();
        let delta = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let expires_at = now
            .checked_add_signed(delta)
            .map_or(latest, |t| t.min(latest));
        Self {
            value,
            expires_at: Some(expires_at),
        }
    }

    /// Whether the recorded expiry is at or before `now`
    ///
    /// The store itself never calls this; it is here for callers that want to
    /// enforce expiry on top of [`crate::FileStore::entry`].
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }

    /// Encode to the on-disk JSON form
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from the on-disk JSON form
    pub fn from_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
