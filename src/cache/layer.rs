//! Cache layer that orchestrates caching logic with network fetching.

use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use super::traits::{CacheResult, CacheStore};
use crate::news::Article;

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the application and the network client.
/// Expired entries are never served: the store drops them on read, so a
/// failed fetch after expiry surfaces as an error.
pub struct CacheLayer<S: CacheStore> {
  storage: Arc<S>,
}

impl<S: CacheStore> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Fetch a day's articles with a cache-first strategy.
  ///
  /// 1. Check cache - if fresh, return immediately
  /// 2. If missing (or just expired), run `fetcher`
  /// 3. On success, store the result before returning it
  /// 4. On failure, return the error and leave the cache untouched
  ///
  /// The store is only written once `fetcher` has fully resolved, so
  /// dropping this future mid-fetch leaves the cache as it was.
  pub async fn fetch<F, Fut, E>(
    &self,
    key: NaiveDate,
    fetcher: F,
  ) -> Result<CacheResult<Vec<Article>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Article>, E>>,
  {
    // Check cache first
    if let Some(cached) = self.storage.get(key) {
      info!(date = %key, count = cached.articles.len(), "Serving articles from cache");
      return Ok(CacheResult::from_cache(cached.articles, cached.stored_at));
    }

    debug!(date = %key, "Cache miss; fetching");
    let data = fetcher().await?;
    self.storage.put(key, &data);
    Ok(CacheResult::from_network(data))
  }

  /// Drop any cached entry for `key`.
  pub fn invalidate(&self, key: NaiveDate) {
    self.storage.purge(key);
  }
}

impl<S: CacheStore> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}


#[cfg(test)]
mod tests {
  use super::testing::RecordingStore;
  use super::*;
  use crate::cache::CacheSource;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
  }

  fn sample() -> Vec<Article> {
    vec![Article {
      title: Some("cached headline".to_string()),
      ..Default::default()
    }]
  }

  #[tokio::test]
  async fn test_hit_skips_fetcher() {
    let layer = CacheLayer::new(RecordingStore::with_entry(day(), sample()));
    let calls = AtomicUsize::new(0);

    let result = layer
      .fetch(day(), || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(Vec::new())
      })
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.source, CacheSource::Cache);
    assert!(result.cached_at.is_some());
    assert_eq!(result.data, sample());
    assert_eq!(layer.storage().put_count(), 0);
  }

  #[tokio::test]
  async fn test_miss_fetches_and_stores() {
    let layer = CacheLayer::new(RecordingStore::default());

    let result = layer
      .fetch(day(), || async { Ok::<_, String>(sample()) })
      .await
      .unwrap();

    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data, sample());
    assert_eq!(*layer.storage().puts.lock().unwrap(), vec![day()]);

    // Second call is served from cache.
    let again = layer
      .fetch(day(), || async { Err::<Vec<Article>, _>("should not run".to_string()) })
      .await
      .unwrap();
    assert_eq!(again.source, CacheSource::Cache);
  }

  #[tokio::test]
  async fn test_failure_propagates_without_store() {
    let layer = CacheLayer::new(RecordingStore::default());

    let err = layer
      .fetch(day(), || async { Err::<Vec<Article>, _>("boom".to_string()) })
      .await
      .unwrap_err();

    assert_eq!(err, "boom");
    assert_eq!(layer.storage().put_count(), 0);
  }

  #[tokio::test]
  async fn test_empty_success_is_stored() {
    let layer = CacheLayer::new(RecordingStore::default());
    let result = layer
      .fetch(day(), || async { Ok::<_, String>(Vec::new()) })
      .await
      .unwrap();
    assert!(result.data.is_empty());
    assert_eq!(layer.storage().put_count(), 1);
  }

  #[tokio::test]
  async fn test_invalidate_forces_refetch() {
    let layer = CacheLayer::new(RecordingStore::with_entry(day(), sample()));
    layer.invalidate(day());

    let result = layer
      .fetch(day(), || async { Ok::<_, String>(Vec::new()) })
      .await
      .unwrap();
    assert_eq!(result.source, CacheSource::Network);
  }
}
