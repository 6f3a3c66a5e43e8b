//! Normalizing the two response shapes we can get back.
//!
//! The direct API and the local proxy return the API envelope as-is. The
//! public relay nests it as a JSON string under `contents`. Each shape has a
//! parser variant; variants are tried in a fixed order and the first one that
//! matches wins.

use super::api_types::{ApiEnvelope, RelayEnvelope};
use super::error::NewsError;
use super::strategy::ApproachKind;
use super::types::Article;

/// Bytes of a bad body kept for the error message.
const EXCERPT_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeParser {
  /// `{"status": ..., "articles": [...], "message": ...}`
  Direct,
  /// `{"contents": "<direct envelope as a JSON string>"}`
  Relay,
}

impl EnvelopeParser {
  pub const ORDER: [EnvelopeParser; 2] = [EnvelopeParser::Direct, EnvelopeParser::Relay];

  pub fn parse(self, body: &str) -> Result<ApiEnvelope, serde_json::Error> {
    match self {
      Self::Direct => serde_json::from_str(body),
      Self::Relay => {
        let relay: RelayEnvelope = serde_json::from_str(body)?;
        serde_json::from_str(&relay.contents)
      }
    }
  }
}

/// Parse a selected response body into articles.
///
/// Fails with [`NewsError::MalformedResponse`] when no parser variant
/// matches, and with [`NewsError::UpstreamReported`] when the envelope parses
/// but reports a non-ok status.
pub fn parse_body(body: &str, approach: ApproachKind) -> Result<Vec<Article>, NewsError> {
  let envelope = EnvelopeParser::ORDER
    .iter()
    .find_map(|parser| match parser.parse(body) {
      Ok(envelope) => {
        tracing::debug!(?parser, %approach, "Response envelope recognized");
        Some(envelope)
      }
      Err(e) => {
        tracing::debug!(?parser, %approach, error = %e, "Envelope variant did not match");
        None
      }
    })
    .ok_or_else(|| NewsError::MalformedResponse {
      approach,
      excerpt: excerpt(body, EXCERPT_LEN),
    })?;

  if !envelope.is_ok() {
    return Err(NewsError::UpstreamReported {
      code: envelope.code,
      message: envelope
        .message
        .unwrap_or_else(|| format!("Unknown error (status '{}')", envelope.status)),
    });
  }

  Ok(
    envelope
      .articles
      .into_iter()
      .map(|a| a.into_article())
      .collect(),
  )
}

/// Truncate `s` to at most `max` bytes on a char boundary, noting what was cut.
pub fn excerpt(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}
