//! Cached news client that wraps NewsClient with transparent caching.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::cache::{CacheLayer, CacheResult, CacheStore, NoopStorage};

use super::client::NewsClient;
use super::error::NewsError;
use super::transport::{ReqwestTransport, Transport};
use super::types::Article;

pub type Retrieved = CacheResult<Vec<Article>>;

/// News client with transparent day-keyed caching.
///
/// A fresh cache entry for the requested day short-circuits the network
/// entirely. Failures are never papered over with old data.
pub struct CachedNewsClient<T: Transport = ReqwestTransport, S: CacheStore = NoopStorage> {
  inner: Arc<NewsClient<T>>,
  cache: CacheLayer<S>,
}

impl<T: Transport, S: CacheStore> CachedNewsClient<T, S> {
  pub fn new(inner: NewsClient<T>, storage: S) -> Self {
    Self {
      inner: Arc::new(inner),
      cache: CacheLayer::new(storage),
    }
  }

  pub fn query(&self) -> &str {
    self.inner.query()
  }

  /// Articles for `date_key`, from cache when fresh, otherwise from the API.
  #[instrument(level = "info", skip(self), fields(query = %self.inner.query()))]
  pub async fn retrieve(&self, date_key: NaiveDate) -> Result<Retrieved, NewsError> {
    let result = self
      .cache
      .fetch(date_key, || {
        let inner = Arc::clone(&self.inner);
        async move { inner.fetch_articles(date_key).await }
      })
      .await?;

    info!(
      source = %result.source,
      count = result.data.len(),
      "Retrieved articles"
    );
    Ok(result)
  }

  /// Drop the cached entry for `date_key` and retrieve again.
  pub async fn refresh(&self, date_key: NaiveDate) -> Result<Retrieved, NewsError> {
    self.cache.invalidate(date_key);
    self.retrieve(date_key).await
  }

  #[cfg(test)]
  fn storage(&self) -> &S {
    self.cache.storage()
  }
}

impl<T: Transport, S: CacheStore> Clone for CachedNewsClient<T, S> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
      cache: self.cache.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheSource, ManualClock, RecordingStore, SqliteStorage};
  use crate::config::NewsConfig;
  use crate::news::transport::testing::{Scripted, StubTransport};
  use crate::sentiment::classify;
  use chrono::{Duration, TimeZone, Utc};
  use std::time::Duration as StdDuration;

  const BULLISH_BODY: &str = concat!(
    r#"{"status":"ok","articles":["#,
    r#"{"title":"Bitcoin price up sharply","description":"gains continue"}]}"#
  );

  fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
  }

  fn client<S: CacheStore>(
    transport: Arc<StubTransport>,
    storage: S,
  ) -> CachedNewsClient<Arc<StubTransport>, S> {
    let news =
      NewsClient::with_transport(&NewsConfig::default(), Some("k".into()), transport).unwrap();
    CachedNewsClient::new(news, storage)
  }

  #[tokio::test]
  async fn test_fresh_cache_skips_network() {
    let transport = Arc::new(StubTransport::ok(BULLISH_BODY));
    let cached = vec![Article {
      title: Some("from yesterday's fetch".into()),
      ..Default::default()
    }];
    let client = client(transport.clone(), RecordingStore::with_entry(day(), cached.clone()));

    let result = client.retrieve(day()).await.unwrap();

    assert_eq!(transport.call_count(), 0);
    assert_eq!(result.source, CacheSource::Cache);
    assert_eq!(result.data, cached);
  }

  #[tokio::test]
  async fn test_miss_fetches_then_stores() {
    let transport = Arc::new(StubTransport::ok(BULLISH_BODY));
    let client = client(transport.clone(), RecordingStore::default());

    let first = client.retrieve(day()).await.unwrap();
    assert_eq!(first.source, CacheSource::Network);
    assert_eq!(client.storage().put_count(), 1);

    let second = client.retrieve(day()).await.unwrap();
    assert_eq!(second.source, CacheSource::Cache);
    assert_eq!(transport.call_count(), 1);
    assert_eq!(first.data, second.data);
  }

  #[tokio::test]
  async fn test_end_to_end_bullish_classification() {
    let transport = Arc::new(StubTransport::ok(BULLISH_BODY));
    let client = client(transport, RecordingStore::default());

    let articles = client.retrieve(day()).await.unwrap().data;
    let classified = classify(&articles);

    assert_eq!(classified.bullish.len(), 1);
    assert!(classified.bullish[0].sentiment.score >= 2);
    assert!(classified.bearish.is_empty());
  }

  #[tokio::test]
  async fn test_upstream_error_is_not_cached() {
    let transport = Arc::new(StubTransport::ok(
      r#"{"status":"error","message":"rate limited"}"#,
    ));
    let client = client(transport, RecordingStore::default());

    let err = client.retrieve(day()).await.unwrap_err();

    assert!(matches!(
      err,
      NewsError::UpstreamReported { ref message, .. } if message == "rate limited"
    ));
    assert_eq!(client.storage().put_count(), 0);
  }

  #[tokio::test]
  async fn test_all_failed_propagates() {
    let transport = Arc::new(StubTransport::new([
      Scripted::Fail("a".into()),
      Scripted::Fail("b".into()),
      Scripted::Fail("c".into()),
    ]));
    let client = client(transport, RecordingStore::default());

    let err = client.retrieve(day()).await.unwrap_err();
    assert!(matches!(err, NewsError::AllApproachesFailed { ref attempts } if attempts.len() == 3));
    assert_eq!(client.storage().put_count(), 0);
  }

  #[tokio::test]
  async fn test_expired_entry_is_refetched_not_served() {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 15, 6, 0, 0).unwrap()));
    let storage = SqliteStorage::open_in_memory().unwrap().with_clock(clock.clone());
    storage.put(day(), &[Article::default()]);
    clock.advance(Duration::hours(30));

    // Network is down: the expired entry must not be used as a fallback.
    let transport = Arc::new(StubTransport::new([
      Scripted::Respond(503, String::new()),
      Scripted::Respond(503, String::new()),
      Scripted::Respond(503, String::new()),
    ]));
    let client = client(transport, storage);

    assert!(client.retrieve(day()).await.is_err());
    assert!(client.storage().get(day()).is_none());
  }

  #[tokio::test]
  async fn test_cancelled_retrieve_writes_nothing() {
    let transport = Arc::new(StubTransport::new([Scripted::Hang]));
    let client = client(transport.clone(), RecordingStore::default());

    let abandoned =
      tokio::time::timeout(StdDuration::from_millis(50), client.retrieve(day())).await;

    assert!(abandoned.is_err(), "retrieve should still have been in flight");
    assert_eq!(transport.call_count(), 1);
    assert_eq!(client.storage().put_count(), 0);
  }

  #[tokio::test]
  async fn test_cancelled_refetch_keeps_prior_entry() {
    let transport = Arc::new(StubTransport::new([Scripted::Hang]));
    let prior = vec![Article {
      title: Some("still valid".into()),
      ..Default::default()
    }];
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.put(day(), &prior);
    let client = client(transport, storage);

    // Fetch for a different day hangs and is abandoned.
    let other_day = day().succ_opt().unwrap();
    let _ = tokio::time::timeout(StdDuration::from_millis(50), client.retrieve(other_day)).await;

    assert_eq!(client.storage().get(day()).unwrap().articles, prior);
    assert!(client.storage().get(other_day).is_none());
  }

  #[tokio::test]
  async fn test_refresh_bypasses_fresh_entry() {
    let transport = Arc::new(StubTransport::ok(BULLISH_BODY));
    let client = client(
      transport.clone(),
      RecordingStore::with_entry(day(), vec![Article::default()]),
    );

    let result = client.refresh(day()).await.unwrap();
    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(transport.call_count(), 1);
  }
}
