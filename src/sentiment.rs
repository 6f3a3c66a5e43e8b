//! Keyword-count sentiment scoring.
//!
//! Scoring is deliberately naive: each keyword is counted as a plain
//! substring of the lower-cased text, so "upward" hits both `up` and
//! `upward`, and "support" hits `up`.

use crate::news::Article;

pub const BULLISH_KEYWORDS: [&str; 10] = [
  "rise",
  "gain",
  "up",
  "increase",
  "bull",
  "positive",
  "optimistic",
  "growth",
  "strong",
  "upward",
];

pub const BEARISH_KEYWORDS: [&str; 10] = [
  "fall",
  "drop",
  "down",
  "decrease",
  "bear",
  "negative",
  "pessimistic",
  "weak",
  "downward",
  "loss",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentResult {
  pub score: i64,
  pub bullish_count: u32,
  pub bearish_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
  Bullish,
  Bearish,
  Neutral,
}

impl SentimentResult {
  pub fn sentiment(&self) -> Sentiment {
    match self.score {
      s if s > 0 => Sentiment::Bullish,
      s if s < 0 => Sentiment::Bearish,
      _ => Sentiment::Neutral,
    }
  }
}

/// Score `text` against both keyword sets.
pub fn score(text: &str) -> SentimentResult {
  let lower = text.to_lowercase();
  let bullish_count = count_all(&lower, &BULLISH_KEYWORDS);
  let bearish_count = count_all(&lower, &BEARISH_KEYWORDS);

  SentimentResult {
    score: i64::from(bullish_count) - i64::from(bearish_count),
    bullish_count,
    bearish_count,
  }
}

/// Non-overlapping occurrences of every keyword, summed.
fn count_all(haystack: &str, keywords: &[&str]) -> u32 {
  keywords
    .iter()
    .map(|kw| haystack.matches(kw).count() as u32)
    .sum()
}

/// An article paired with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
  pub article: Article,
  pub sentiment: SentimentResult,
}

/// Articles split into the two summary buckets. Neutral articles are only
/// counted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedArticles {
  pub bullish: Vec<Scored>,
  pub bearish: Vec<Scored>,
  pub neutral: usize,
  pub total: usize,
}

impl ClassifiedArticles {
  pub fn is_empty(&self) -> bool {
    self.total == 0
  }
}

/// Score every article and bucket it. Input order is kept within a bucket.
pub fn classify(articles: &[Article]) -> ClassifiedArticles {
  let mut out = ClassifiedArticles {
    total: articles.len(),
    ..Default::default()
  };

  for article in articles {
    let sentiment = score(&article.sentiment_text());
    let scored = Scored {
      article: article.clone(),
      sentiment,
    };
    match sentiment.sentiment() {
      Sentiment::Bullish => out.bullish.push(scored),
      Sentiment::Bearish => out.bearish.push(scored),
      Sentiment::Neutral => out.neutral += 1,
    }
  }

  tracing::debug!(
    total = out.total,
    bullish = out.bullish.len(),
    bearish = out.bearish.len(),
    neutral = out.neutral,
    "Classified articles"
  );
  out
}
