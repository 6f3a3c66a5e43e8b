//! Serde-deserializable types matching the news API and relay responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::types::Article;

pub const STATUS_OK: &str = "ok";

/// Top-level news API response, for both success and error.
///
/// A string `status` is what makes a body this envelope. Everything else is
/// read leniently so an error report is never lost to a mistyped field.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
  pub status: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub articles: Vec<ApiArticle>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub code: Option<String>,
  #[serde(default, deserialize_with = "lenient_text")]
  pub message: Option<String>,
}

impl ApiEnvelope {
  pub fn is_ok(&self) -> bool {
    self.status == STATUS_OK
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiSource {
  pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticle {
  pub source: Option<ApiSource>,
  pub author: Option<String>,
  pub title: Option<String>,
  pub description: Option<String>,
  pub url: Option<String>,
  pub published_at: Option<String>,
}

impl ApiArticle {
  pub fn into_article(self) -> Article {
    // A bad timestamp costs the article its date, not its place in the list.
    let published_at = self
      .published_at
      .as_deref()
      .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
      .map(|dt| dt.with_timezone(&Utc));

    Article {
      title: self.title,
      description: self.description,
      url: self.url,
      published_at,
      source: self.source.and_then(|s| s.name),
      author: self.author,
    }
  }
}

/// `null` reads as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON scalar as text; `null` is absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<Value>::deserialize(deserializer)? {
    None | Some(Value::Null) => None,
    Some(Value::String(s)) => Some(s),
    Some(other) => Some(other.to_string()),
  })
}

/// Envelope returned by the public relay: the upstream body as a JSON string.
#[derive(Debug, Deserialize)]
pub struct RelayEnvelope {
  pub contents: String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_full_article_conversion() {
    let api: ApiArticle = serde_json::from_str(
      r#"{
        "source": {"id": null, "name": "CoinDesk"},
        "author": "Jane Doe",
        "title": "Bitcoin up",
        "description": "More gains",
        "url": "https://example.com/btc",
        "urlToImage": null,
        "publishedAt": "2024-03-14T09:30:00Z",
        "content": "..."
      }"#,
    )
    .unwrap();

    let article = api.into_article();
    assert_eq!(article.source.as_deref(), Some("CoinDesk"));
    assert_eq!(article.author.as_deref(), Some("Jane Doe"));
    assert_eq!(
      article.published_at,
      Some(Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap())
    );
  }

  #[test]
  fn test_sparse_article_conversion() {
    let api: ApiArticle = serde_json::from_str(r#"{"publishedAt": "yesterday"}"#).unwrap();
    let article = api.into_article();
    assert_eq!(article, Article::default());
  }

  #[test]
  fn test_error_envelope() {
    let env: ApiEnvelope = serde_json::from_str(
      r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid"}"#,
    )
    .unwrap();
    assert!(!env.is_ok());
    assert!(env.articles.is_empty());
    assert_eq!(env.code.as_deref(), Some("apiKeyInvalid"));
  }

  #[test]
  fn test_envelope_tolerates_null_and_numeric_fields() {
    let env: ApiEnvelope =
      serde_json::from_str(r#"{"status": "error", "articles": null, "code": 42, "message": null}"#)
        .unwrap();
    assert!(env.articles.is_empty());
    assert_eq!(env.code.as_deref(), Some("42"));
    assert_eq!(env.message, None);
  }

  #[test]
  fn test_non_string_status_is_not_an_envelope() {
    let parsed = serde_json::from_str::<ApiEnvelope>(r#"{"status": {"http_code": 200}}"#);
    assert!(parsed.is_err());
  }
}
