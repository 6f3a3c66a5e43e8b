//! What the presentation layer shows above the article panes.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::cache::CacheSource;
use crate::news::{Article, Retrieved};
use crate::query::QueryState;
use crate::sentiment::{classify, ClassifiedArticles};

/// One finished retrieval, scored and bucketed.
#[derive(Debug, Clone)]
pub struct Dashboard {
  pub date: NaiveDate,
  pub articles: Vec<Article>,
  pub classified: ClassifiedArticles,
  pub source: CacheSource,
  pub cached_at: Option<DateTime<Utc>>,
}

impl Dashboard {
  pub fn from_retrieved(date: NaiveDate, retrieved: Retrieved) -> Self {
    let classified = classify(&retrieved.data);
    Self {
      date,
      articles: retrieved.data,
      classified,
      source: retrieved.source,
      cached_at: retrieved.cached_at,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
  MissingConfiguration(String),
  Fetching,
  NoResults,
  Loaded {
    bullish: usize,
    bearish: usize,
    source: CacheSource,
  },
  Failed(String),
}

impl Status {
  /// A setup error (no API key, bad URL) wins over whatever the query says,
  /// since the query never ran.
  pub fn derive(setup_error: Option<&str>, state: &QueryState<Dashboard>) -> Self {
    if let Some(msg) = setup_error {
      return Status::MissingConfiguration(msg.to_string());
    }
    match state {
      QueryState::Idle | QueryState::Loading => Status::Fetching,
      QueryState::Error(e) => Status::Failed(e.clone()),
      QueryState::Success(d) if d.classified.is_empty() => Status::NoResults,
      QueryState::Success(d) => Status::Loaded {
        bullish: d.classified.bullish.len(),
        bearish: d.classified.bearish.len(),
        source: d.source,
      },
    }
  }

  pub fn message(&self) -> String {
    match self {
      Status::MissingConfiguration(msg) => format!("Configuration missing: {}", msg),
      Status::Fetching => "Fetching news...".to_string(),
      Status::NoResults => "No articles found for this day.".to_string(),
      Status::Loaded {
        bullish,
        bearish,
        source,
      } => format!(
        "{} bullish, {} bearish (from {})",
        bullish, bearish, source
      ),
      Status::Failed(msg) => format!("Failed to fetch news: {}", msg),
    }
  }
}

/// "cached 14:02" style note for the header, in local time.
pub fn cached_note(cached_at: Option<DateTime<Utc>>) -> Option<String> {
  cached_at.map(|t| format!("cached {}", t.with_timezone(&Local).format("%H:%M")))
}
