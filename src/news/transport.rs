//! HTTP transport seam.
//!
//! The fetch strategy only needs "GET this URL, give me status and body".
//! Keeping that behind a trait lets tests script responses without a server.

use std::future::Future;
use url::Url;

use super::error::AttemptError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
  pub status: u16,
  pub body: String,
}

impl HttpResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

pub trait Transport: Send + Sync {
  /// Issue a GET. Non-2xx statuses are returned as responses, not errors;
  /// only failures to get a response at all are errors.
  fn get(&self, url: &Url) -> impl Future<Output = Result<HttpResponse, AttemptError>> + Send;
}

/// reqwest-backed transport used outside tests.
#[derive(Clone)]
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  pub fn new() -> Result<Self, reqwest::Error> {
    // The news API rejects requests without a User-Agent.
    let client = reqwest::Client::builder()
      .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client })
  }
}

impl Transport for ReqwestTransport {
  async fn get(&self, url: &Url) -> Result<HttpResponse, AttemptError> {
    // without_url(): the URL carries the API key.
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| AttemptError::Transport(e.without_url().to_string()))?;

    let status = response.status().as_u16();
    let body = response
      .text()
      .await
      .map_err(|e| AttemptError::Transport(e.without_url().to_string()))?;

    Ok(HttpResponse { status, body })
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_success_range() {
    let resp = |status| HttpResponse {
      status,
      body: String::new(),
    };
    assert!(resp(200).is_success());
    assert!(resp(204).is_success());
    assert!(!resp(301).is_success());
    assert!(!resp(429).is_success());
    assert!(!resp(500).is_success());
  }
}
