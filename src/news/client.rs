use chrono::NaiveDate;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::config::NewsConfig;

use super::error::NewsError;
use super::strategy::{Endpoints, FetchStrategy, QueryDefaults};
use super::transport::{ReqwestTransport, Transport};
use super::types::Article;

/// News API client wrapper.
///
/// Owns everything needed to fetch one page of articles for the configured
/// query. Construction validates configuration, so a client that exists can
/// always attempt the network.
pub struct NewsClient<T: Transport = ReqwestTransport> {
  strategy: FetchStrategy<T>,
  query: String,
  page_size: u32,
}

impl NewsClient<ReqwestTransport> {
  pub fn new(config: &NewsConfig, api_key: Option<String>) -> Result<Self, NewsError> {
    let transport = ReqwestTransport::new()
      .map_err(|e| NewsError::ConfigurationMissing(format!("HTTP client unavailable: {}", e)))?;
    Self::with_transport(config, api_key, transport)
  }
}

impl<T: Transport> NewsClient<T> {
  pub fn with_transport(
    config: &NewsConfig,
    api_key: Option<String>,
    transport: T,
  ) -> Result<Self, NewsError> {
    let api_key = api_key.ok_or_else(|| {
      NewsError::ConfigurationMissing(format!(
        "news API key not found. Set {} or {}, or news.api_key in the config file",
        crate::config::API_KEY_ENV,
        crate::config::API_KEY_ENV_FALLBACK
      ))
    })?;
    if config.query.trim().is_empty() {
      return Err(NewsError::ConfigurationMissing("news.query is empty".into()));
    }
    if config.page_size == 0 {
      return Err(NewsError::ConfigurationMissing("news.page_size must be at least 1".into()));
    }

    let endpoints = Endpoints {
      base_url: parse_url(&config.base_url, "base_url")?,
      proxy_prefix: config.proxy_prefix.clone().filter(|p| !p.trim().is_empty()),
      relay_url: config
        .relay_url
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(|r| parse_url(r, "relay_url"))
        .transpose()?,
    };
    let defaults = QueryDefaults {
      sort_by: config.sort_by.clone(),
      language: config.language.clone(),
      api_key,
    };

    Ok(Self {
      strategy: FetchStrategy::new(
        transport,
        endpoints,
        defaults,
        Duration::from_secs(config.request_timeout_secs),
      ),
      query: config.query.clone(),
      page_size: config.page_size,
    })
  }

  /// Override the configured search term.
  pub fn with_query(mut self, query: impl Into<String>) -> Self {
    self.query = query.into();
    self
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  /// Fetch articles published since `since` (one page).
  pub async fn fetch_articles(&self, since: NaiveDate) -> Result<Vec<Article>, NewsError> {
    self
      .strategy
      .fetch_articles(&self.query, since, self.page_size)
      .await
  }
}

// The strategy holds the API key, so it stays out of debug output.
impl<T: Transport> fmt::Debug for NewsClient<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NewsClient")
      .field("query", &self.query)
      .field("page_size", &self.page_size)
      .finish_non_exhaustive()
  }
}

fn parse_url(s: &str, what: &'static str) -> Result<Url, NewsError> {
  if s.trim().is_empty() {
    return Err(NewsError::ConfigurationMissing(format!("news.{} is empty", what)));
  }
  Url::parse(s).map_err(|source| NewsError::InvalidUrl { what, source })
}
