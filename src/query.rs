//! Async query abstraction for background fetches driven from the UI loop.
//!
//! A `Query<T>` owns a fetcher closure, runs it on the tokio runtime, and
//! exposes the outcome as a [`QueryState`] the renderer can match on.
//!
//! ```ignore
//! let client = news.clone();
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     async move { client.retrieve(date).await.map_err(|e| e.to_string()) }
//! });
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }
}

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

/// Async query for data fetching with state management.
///
/// At most one fetch is in flight. Starting a new one aborts the previous
/// task, as does dropping the query.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<oneshot::Receiver<Result<T, String>>>,
  task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure that returns a future. It will be called
  /// each time `fetch()` or `refetch()` is invoked.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || fetcher().boxed()),
      receiver: None,
      task: None,
    }
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Start fetching data if not already loading.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Abort any pending fetch and start over.
  pub fn refetch(&mut self) {
    self.cancel();
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.finish();
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.finish();
        true
      }
      Err(oneshot::error::TryRecvError::Empty) => false,
      Err(oneshot::error::TryRecvError::Closed) => {
        // Task died (panicked or aborted) without sending
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.finish();
        true
      }
    }
  }

  /// Abort the in-flight task, if any. State is left as-is.
  pub fn cancel(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
    self.receiver = None;
  }

  fn finish(&mut self) {
    self.receiver = None;
    self.task = None;
  }

  /// Internal: start the fetch operation
  fn start_fetch(&mut self) {
    let (tx, rx) = oneshot::channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    self.task = Some(tokio::spawn(async move {
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(future.await);
    }));
  }
}

impl<T> Drop for Query<T> {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("in_flight", &self.task.is_some())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });

    assert!(matches!(query.state(), QueryState::Idle));

    query.fetch();
    assert!(query.is_loading());

    // Wait for the result
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
    assert!(!query.poll());
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err("rate limited".to_string()) });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(matches!(query.state(), QueryState::Error(e) if e == "rate limited"));
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, String>(42)
      }
    });

    query.fetch();
    query.fetch();
    assert!(query.is_loading());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_refetch_aborts_pending() {
    let finished = Arc::new(AtomicU32::new(0));
    let counter = finished.clone();

    let mut query = Query::new(move || {
      let counter = counter.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(counter.fetch_add(1, Ordering::SeqCst))
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // The first task is aborted, so only the second one ever completes.
    query.refetch();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(query.poll());
    assert_eq!(query.data(), Some(&0));
    assert_eq!(finished.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_drop_aborts_task() {
    let finished = Arc::new(AtomicU32::new(0));
    let counter = finished.clone();
    let mut query = Query::new(move || {
      let counter = counter.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(())
      }
    });

    query.fetch();
    drop(query);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 0);
  }
}
