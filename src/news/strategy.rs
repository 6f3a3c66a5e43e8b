//! Fallback chain over the ways we can reach the news API.
//!
//! Approaches are tried strictly in order: direct, then the local CORS
//! proxy, then the public relay. The first one that answers with a 2xx
//! status is selected and no further approach is tried, even if its body
//! later fails to parse.

use chrono::NaiveDate;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::envelope::parse_body;
use super::error::{AttemptError, AttemptFailure, NewsError};
use super::transport::Transport;
use super::types::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApproachKind {
  Direct,
  LocalProxy,
  Relay,
}

impl fmt::Display for ApproachKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Direct => "direct",
      Self::LocalProxy => "local-proxy",
      Self::Relay => "relay",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchApproach {
  pub kind: ApproachKind,
  pub target: Url,
}

/// Where requests can be sent. Only `base_url` is mandatory.
#[derive(Debug, Clone)]
pub struct Endpoints {
  pub base_url: Url,
  pub proxy_prefix: Option<String>,
  pub relay_url: Option<Url>,
}

/// Fixed parameters shared by every request.
#[derive(Debug, Clone)]
pub struct QueryDefaults {
  pub sort_by: String,
  pub language: String,
  pub api_key: String,
}

/// Response picked by [`first_success`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
  pub approach: ApproachKind,
  pub body: String,
}

impl Endpoints {
  /// Build the ordered approach list for one upstream URL.
  pub fn approaches(&self, upstream: &Url) -> Result<Vec<FetchApproach>, NewsError> {
    let mut approaches = vec![FetchApproach {
      kind: ApproachKind::Direct,
      target: upstream.clone(),
    }];

    if let Some(prefix) = &self.proxy_prefix {
      // The proxy takes the whole upstream URL as its path.
      let target = Url::parse(&format!("{}{}", prefix, upstream))
        .map_err(|source| NewsError::InvalidUrl {
          what: "proxy_prefix",
          source,
        })?;
      approaches.push(FetchApproach {
        kind: ApproachKind::LocalProxy,
        target,
      });
    }

    if let Some(relay) = &self.relay_url {
      let mut target = relay.clone();
      target.query_pairs_mut().append_pair("url", upstream.as_str());
      approaches.push(FetchApproach {
        kind: ApproachKind::Relay,
        target,
      });
    }

    Ok(approaches)
  }
}

/// Try each approach in order; return the first 2xx response.
///
/// Every abandoned approach is reported back in the error, in order.
pub async fn first_success<T: Transport>(
  transport: &T,
  approaches: &[FetchApproach],
  timeout: Duration,
) -> Result<Selected, Vec<AttemptFailure>> {
  let mut failures = Vec::with_capacity(approaches.len());

  for approach in approaches {
    debug!(approach = %approach.kind, target = %redacted(&approach.target), "Trying approach");

    let outcome = match tokio::time::timeout(timeout, transport.get(&approach.target)).await {
      Err(_) => Err(AttemptError::Timeout(timeout)),
      Ok(Err(e)) => Err(e),
      Ok(Ok(resp)) if resp.is_success() => Ok(resp.body),
      Ok(Ok(resp)) => Err(AttemptError::Status(resp.status)),
    };

    match outcome {
      Ok(body) => {
        info!(approach = %approach.kind, bytes = body.len(), "Approach succeeded");
        return Ok(Selected {
          approach: approach.kind,
          body,
        });
      }
      Err(error) => {
        warn!(approach = %approach.kind, %error, "Approach failed; trying next");
        failures.push(AttemptFailure {
          approach: approach.kind,
          error,
        });
      }
    }
  }

  Err(failures)
}

/// Host and path only: query strings carry the API key.
fn redacted(url: &Url) -> String {
  format!("{}{}", url.host_str().unwrap_or(""), url.path())
}

/// Builds requests, runs the fallback chain, and parses the winner.
pub struct FetchStrategy<T: Transport> {
  transport: T,
  endpoints: Endpoints,
  defaults: QueryDefaults,
  timeout: Duration,
}

impl<T: Transport> FetchStrategy<T> {
  pub fn new(
    transport: T,
    endpoints: Endpoints,
    defaults: QueryDefaults,
    timeout: Duration,
  ) -> Self {
    Self {
      transport,
      endpoints,
      defaults,
      timeout,
    }
  }

  /// The upstream URL with every query parameter filled in.
  pub fn upstream_url(&self, query: &str, since: NaiveDate, page_size: u32) -> Url {
    let mut url = self.endpoints.base_url.clone();
    url
      .query_pairs_mut()
      .append_pair("q", query)
      .append_pair("from", &since.to_string())
      .append_pair("sortBy", &self.defaults.sort_by)
      .append_pair("language", &self.defaults.language)
      .append_pair("pageSize", &page_size.to_string())
      .append_pair("apiKey", &self.defaults.api_key);
    url
  }

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_articles(
    &self,
    query: &str,
    since: NaiveDate,
    page_size: u32,
  ) -> Result<Vec<Article>, NewsError> {
    let upstream = self.upstream_url(query, since, page_size);
    let approaches = self.endpoints.approaches(&upstream)?;

    let selected = first_success(&self.transport, &approaches, self.timeout)
      .await
      .map_err(|attempts| NewsError::AllApproachesFailed { attempts })?;

    let articles = parse_body(&selected.body, selected.approach)?;
    info!(approach = %selected.approach, count = articles.len(), "Fetched articles");
    Ok(articles)
  }
}
