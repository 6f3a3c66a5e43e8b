use std::fmt;
use std::time::Duration;

use super::strategy::ApproachKind;

/// Why a single fetch approach was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
  #[error("timed out after {0:?}")]
  Timeout(Duration),
  #[error("HTTP {0}")]
  Status(u16),
  #[error("{0}")]
  Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
  pub approach: ApproachKind,
  pub error: AttemptError,
}

impl fmt::Display for AttemptFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.approach, self.error)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
  #[error("configuration missing: {0}")]
  ConfigurationMissing(String),

  #[error("invalid URL in configuration ({what}): {source}")]
  InvalidUrl {
    what: &'static str,
    source: url::ParseError,
  },

  #[error("all fetch approaches failed ({})", join(.attempts))]
  AllApproachesFailed { attempts: Vec<AttemptFailure> },

  #[error("malformed response from {approach}: {excerpt}")]
  MalformedResponse {
    approach: ApproachKind,
    excerpt: String,
  },

  #[error("news API error: {message}")]
  UpstreamReported {
    code: Option<String>,
    message: String,
  },
}

fn join(attempts: &[AttemptFailure]) -> String {
  if attempts.is_empty() {
    return "no approaches configured".to_string();
  }
  attempts
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_all_failed_message_lists_attempts() {
    let err = NewsError::AllApproachesFailed {
      attempts: vec![
        AttemptFailure {
          approach: ApproachKind::Direct,
          error: AttemptError::Status(426),
        },
        AttemptFailure {
          approach: ApproachKind::Relay,
          error: AttemptError::Timeout(Duration::from_secs(10)),
        },
      ],
    };
    assert_eq!(
      err.to_string(),
      "all fetch approaches failed (direct: HTTP 426; relay: timed out after 10s)"
    );
  }

  #[test]
  fn test_upstream_message() {
    let err = NewsError::UpstreamReported {
      code: Some("rateLimited".to_string()),
      message: "rate limited".to_string(),
    };
    assert_eq!(err.to_string(), "news API error: rate limited");
  }
}
