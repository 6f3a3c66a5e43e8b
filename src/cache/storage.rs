//! Cache storage implementations: SQLite on disk, and a no-op fallback.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::traits::{CacheEntry, CacheError, CacheStore};
use crate::news::Article;

/// Default time-to-live for a day's articles.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled or the database can't be opened.
pub struct NoopStorage;

impl CacheStore for NoopStorage {
  fn get(&self, _key: NaiveDate) -> Option<CacheEntry> {
    None // Always miss
  }

  fn put(&self, _key: NaiveDate, _articles: &[Article]) {
    // Discard
  }

  fn purge(&self, _key: NaiveDate) {}
}

/// SQLite-based cache storage implementation.
///
/// One row per day. Writes are a single `INSERT OR REPLACE`, so readers see
/// either the old row or the new one, never a mix.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
  ttl: Duration,
  clock: Box<dyn Clock>,
}

/// Schema for the cache table.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS article_cache (
    date TEXT PRIMARY KEY,
    articles TEXT NOT NULL,
    stored_at TEXT NOT NULL
);
"#;

impl SqliteStorage {
  /// Create a new SQLite storage at the default location.
  pub fn open() -> Result<Self, CacheError> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open (or create) the cache database at `path`.
  pub fn open_at(path: &Path) -> Result<Self, CacheError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| {
        CacheError::Unavailable(format!(
          "failed to create cache directory {}: {}",
          parent.display(),
          e
        ))
      })?;
    }

    let conn = Connection::open(path).map_err(|e| {
      CacheError::Unavailable(format!(
        "failed to open cache database at {}: {}",
        path.display(),
        e
      ))
    })?;

    Self::from_connection(conn)
  }

  /// Throwaway database, mostly for tests.
  pub fn open_in_memory() -> Result<Self, CacheError> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self, CacheError> {
    let storage = Self {
      conn: Mutex::new(conn),
      ttl: Duration::hours(DEFAULT_TTL_HOURS),
      clock: Box::new(SystemClock),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Set how long an entry stays valid after it is written.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Box::new(clock);
    self
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf, CacheError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| CacheError::Unavailable("could not determine data directory".into()))?;

    Ok(data_dir.join("coinpulse").join("cache.db"))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<(), CacheError> {
    let conn = self.lock()?;
    conn.execute_batch(CACHE_SCHEMA)?;
    Ok(())
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CacheError> {
    self
      .conn
      .lock()
      .map_err(|e| CacheError::Unavailable(format!("lock poisoned: {}", e)))
  }

  fn try_get(&self, key: NaiveDate) -> Result<Option<CacheEntry>, CacheError> {
    let conn = self.lock()?;
    let date = key.to_string();

    let row: Option<(String, String)> = conn
      .query_row(
        "SELECT articles, stored_at FROM article_cache WHERE date = ?",
        params![date],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    let Some((articles_json, stored_at_str)) = row else {
      return Ok(None);
    };

    let stored_at = parse_timestamp(&stored_at_str)?;
    let age = self.clock.now() - stored_at;
    if age >= self.ttl {
      // Lazy expiry: the read that notices it is the one that removes it.
      conn.execute("DELETE FROM article_cache WHERE date = ?", params![date])?;
      debug!(%date, age_secs = age.num_seconds(), "Cache entry expired; deleted");
      return Ok(None);
    }

    let articles: Vec<Article> = serde_json::from_str(&articles_json)?;
    Ok(Some(CacheEntry {
      key,
      articles,
      stored_at,
    }))
  }

  fn try_put(&self, key: NaiveDate, articles: &[Article]) -> Result<(), CacheError> {
    // Serialize before taking the lock; a failure here must not touch the row.
    let data = serde_json::to_string(articles)?;
    let stored_at = self.clock.now().to_rfc3339();

    let conn = self.lock()?;
    conn.execute(
      "INSERT OR REPLACE INTO article_cache (date, articles, stored_at) VALUES (?, ?, ?)",
      params![key.to_string(), data, stored_at],
    )?;
    Ok(())
  }

  fn try_purge(&self, key: NaiveDate) -> Result<(), CacheError> {
    let conn = self.lock()?;
    conn.execute(
      "DELETE FROM article_cache WHERE date = ?",
      params![key.to_string()],
    )?;
    Ok(())
  }
}

impl CacheStore for SqliteStorage {
  fn get(&self, key: NaiveDate) -> Option<CacheEntry> {
    match self.try_get(key) {
      Ok(entry) => entry,
      Err(e) => {
        warn!(date = %key, error = %e, "Cache read failed; treating as miss");
        None
      }
    }
  }

  fn put(&self, key: NaiveDate, articles: &[Article]) {
    match self.try_put(key, articles) {
      Ok(()) => debug!(date = %key, count = articles.len(), "Cached articles"),
      Err(e) => warn!(date = %key, error = %e, "Cache write failed; continuing without cache"),
    }
  }

  fn purge(&self, key: NaiveDate) {
    if let Err(e) = self.try_purge(key) {
      warn!(date = %key, error = %e, "Cache purge failed");
    }
  }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, CacheError> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|source| CacheError::Timestamp {
      value: s.to_string(),
      source,
    })
}
