//! Core traits and types for the caching system.

use chrono::{DateTime, NaiveDate, Utc};

use crate::news::Article;

/// One day's worth of cached articles.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
  pub key: NaiveDate,
  pub articles: Vec<Article>,
  pub stored_at: DateTime<Utc>,
}

/// Storage-layer failure. Never leaves the store: [`CacheStore`]
/// implementations log it and degrade to a miss or a no-op.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  #[error("cache unavailable: {0}")]
  Unavailable(String),
  #[error("cache query failed: {0}")]
  Sql(#[from] rusqlite::Error),
  #[error("cached articles could not be (de)serialized: {0}")]
  Serde(#[from] serde_json::Error),
  #[error("bad timestamp '{value}' in cache: {source}")]
  Timestamp {
    value: String,
    source: chrono::ParseError,
  },
}

/// Date-keyed article store with lazy expiry.
///
/// Implementations must be infallible from the caller's point of view:
/// caching is an optimization, so errors are logged and swallowed.
pub trait CacheStore: Send + Sync {
  /// Return the entry for `key` if it is younger than the TTL.
  /// An expired entry is deleted as part of the lookup.
  fn get(&self, key: NaiveDate) -> Option<CacheEntry>;

  /// Replace whatever is stored under `key`, stamped with the current time.
  fn put(&self, key: NaiveDate, articles: &[Article]);

  /// Drop the entry for `key`, if any.
  fn purge(&self, key: NaiveDate);
}

/// Lets the backend be picked at runtime (SQLite, or no-op when disabled).
impl CacheStore for Box<dyn CacheStore> {
  fn get(&self, key: NaiveDate) -> Option<CacheEntry> {
    self.as_ref().get(key)
  }

  fn put(&self, key: NaiveDate, articles: &[Article]) {
    self.as_ref().put(key, articles)
  }

  fn purge(&self, key: NaiveDate) {
    self.as_ref().purge(key)
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where returned data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Unexpired data from the local cache
  Cache,
}

impl std::fmt::Display for CacheSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Network => f.write_str("network"),
      Self::Cache => f.write_str("cache"),
    }
  }
}
