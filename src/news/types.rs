use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "Untitled";
pub const NO_DESCRIPTION: &str = "No description available";

/// A news article as the rest of the app sees it.
///
/// Upstream payloads routinely omit the title or description, so both are
/// optional. Use [`Article::display_title`] / [`Article::display_description`]
/// when rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
  pub title: Option<String>,
  pub description: Option<String>,
  pub url: Option<String>,
  pub published_at: Option<DateTime<Utc>>,
  /// Outlet name as reported by the API (e.g. "Reuters")
  pub source: Option<String>,
  pub author: Option<String>,
}

impl Article {
  pub fn display_title(&self) -> &str {
    non_blank(self.title.as_deref()).unwrap_or(UNTITLED)
  }

  pub fn display_description(&self) -> &str {
    non_blank(self.description.as_deref()).unwrap_or(NO_DESCRIPTION)
  }

  /// Text fed to the sentiment scorer: headline and description joined.
  /// Missing parts are skipped rather than replaced with placeholders.
  pub fn sentiment_text(&self) -> String {
    [self.title.as_deref(), self.description.as_deref()]
      .into_iter()
      .flatten()
      .filter(|s| !s.trim().is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
  s.filter(|s| !s.trim().is_empty())
}
