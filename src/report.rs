//! Plain-text rendering of a dashboard, used by `--print`.

use std::fmt::Write;

use crate::sentiment::Scored;
use crate::status::{cached_note, Dashboard};

/// Render the two summaries followed by every article with its link.
pub fn render(query: &str, dashboard: &Dashboard) -> String {
  let mut out = String::new();
  let classified = &dashboard.classified;

  let _ = write!(out, "{} news for {} ({}", query, dashboard.date, dashboard.source);
  if let Some(note) = cached_note(dashboard.cached_at) {
    let _ = write!(out, ", {}", note);
  }
  let _ = writeln!(out, ")");

  if classified.is_empty() {
    let _ = writeln!(out, "\nNo articles found.");
    return out;
  }

  write_summary(&mut out, "Bullish", &classified.bullish);
  write_summary(&mut out, "Bearish", &classified.bearish);
  let _ = writeln!(
    out,
    "\n{} of {} articles were neutral.",
    classified.neutral, classified.total
  );

  let _ = writeln!(out, "\nAll articles");
  for article in &dashboard.articles {
    let _ = writeln!(out, "\n  {}", article.display_title());
    let _ = writeln!(out, "  {}", article.display_description());
    if let Some(url) = article.url.as_deref() {
      let _ = writeln!(out, "  {}", url);
    }
  }
  out
}

fn write_summary(out: &mut String, label: &str, articles: &[Scored]) {
  let _ = writeln!(out, "\n{} Articles ({} articles)", label, articles.len());
  for scored in articles {
    let _ = writeln!(
      out,
      "  [{:+}] {}: {}",
      scored.sentiment.score,
      scored.article.display_title(),
      scored.article.display_description()
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheResult;
  use crate::news::Article;
  use chrono::NaiveDate;

  fn dashboard(articles: Vec<Article>) -> Dashboard {
    Dashboard::from_retrieved(
      NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
      CacheResult::from_network(articles),
    )
  }

  #[test]
  fn test_render_buckets_and_links() {
    let report = render(
      "bitcoin",
      &dashboard(vec![
        Article {
          title: Some("Bitcoin price up sharply".into()),
          description: Some("gains continue".into()),
          url: Some("https://example.com/a".into()),
          ..Default::default()
        },
        Article {
          title: Some("Miners report loss".into()),
          ..Default::default()
        },
      ]),
    );

    assert!(report.starts_with("bitcoin news for 2024-03-14 (network)"));
    assert!(report.contains("Bullish Articles (1 articles)"));
    assert!(report.contains("[+2] Bitcoin price up sharply: gains continue"));
    assert!(report.contains("Bearish Articles (1 articles)"));
    assert!(report.contains("[-1] Miners report loss: No description available"));
    assert!(report.contains("0 of 2 articles were neutral."));
    assert!(report.contains("https://example.com/a"));
  }

  #[test]
  fn test_render_empty_day() {
    let report = render("bitcoin", &dashboard(Vec::new()));
    assert!(report.contains("No articles found."));
    assert!(!report.contains("Bullish"));
  }
}
