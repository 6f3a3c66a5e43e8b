use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "COINPULSE_NEWS_API_KEY";
pub const API_KEY_ENV_FALLBACK: &str = "NEWS_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub news: NewsConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  /// Custom title for header (defaults to the program name)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
  /// Upstream search endpoint
  pub base_url: String,
  /// Prefix for the local CORS proxy; the full upstream URL is appended to it.
  /// Set to null to skip this approach.
  pub proxy_prefix: Option<String>,
  /// Public relay that wraps the upstream body in `{"contents": ...}`.
  /// Set to null to skip this approach.
  pub relay_url: Option<String>,
  /// Search term
  pub query: String,
  pub sort_by: String,
  pub language: String,
  pub page_size: u32,
  /// Per-approach timeout
  pub request_timeout_secs: u64,
  /// API key; the environment variables take precedence
  pub api_key: Option<String>,
}

impl Default for NewsConfig {
  fn default() -> Self {
    Self {
      base_url: "https://newsapi.org/v2/everything".to_string(),
      proxy_prefix: Some("http://localhost:8001/".to_string()),
      relay_url: Some("https://api.allorigins.win/get".to_string()),
      query: "bitcoin".to_string(),
      sort_by: "publishedAt".to_string(),
      language: "en".to_string(),
      page_size: 20,
      request_timeout_secs: 10,
      api_key: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  pub ttl_hours: i64,
  /// Database file (default: $XDG_DATA_HOME/coinpulse/cache.db)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      ttl_hours: crate::cache::DEFAULT_TTL_HOURS,
      path: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./coinpulse.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/coinpulse/config.yaml
  ///
  /// Unlike the explicit path, the implicit locations are optional: with no
  /// file found, built-in defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("coinpulse.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("coinpulse").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not an empty map.
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Resolve the news API key.
  ///
  /// Checks COINPULSE_NEWS_API_KEY first, then NEWS_API_KEY, then the
  /// config file. Blank values count as unset.
  pub fn api_key(&self) -> Option<String> {
    Self::api_key_from(|name| std::env::var(name).ok(), self.news.api_key.as_deref())
  }

  fn api_key_from(
    env: impl Fn(&str) -> Option<String>,
    file_value: Option<&str>,
  ) -> Option<String> {
    let non_blank = |v: Option<String>| v.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());

    non_blank(env(API_KEY_ENV))
      .or_else(|| non_blank(env(API_KEY_ENV_FALLBACK)))
      .or_else(|| non_blank(file_value.map(String::from)))
  }

  pub fn header_title(&self) -> &str {
    self.title.as_deref().unwrap_or(env!("CARGO_PKG_NAME"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.news.query, "bitcoin");
    assert_eq!(config.news.page_size, 20);
    assert!(config.news.proxy_prefix.is_some());
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl_hours, 24);
    assert_eq!(config.header_title(), "coinpulse");
  }

  #[test]
  fn test_partial_yaml_keeps_defaults() {
    let config = Config::from_yaml(
      r#"
news:
  query: ethereum
  proxy_prefix: null
cache:
  ttl_hours: 6
title: ETH desk
"#,
    )
    .unwrap();

    assert_eq!(config.news.query, "ethereum");
    assert!(config.news.proxy_prefix.is_none());
    assert_eq!(config.news.language, "en");
    assert_eq!(config.cache.ttl_hours, 6);
    assert!(config.cache.enabled);
    assert_eq!(config.header_title(), "ETH desk");
  }

  #[test]
  fn test_empty_yaml_is_default() {
    let config = Config::from_yaml("  \n").unwrap();
    assert_eq!(config.news.base_url, NewsConfig::default().base_url);
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_api_key_precedence() {
    let env = |name: &str| match name {
      API_KEY_ENV => Some("primary".to_string()),
      API_KEY_ENV_FALLBACK => Some("fallback".to_string()),
      _ => None,
    };
    assert_eq!(Config::api_key_from(env, Some("file")), Some("primary".into()));

    let fallback_only = |name: &str| (name == API_KEY_ENV_FALLBACK).then(|| "fallback".to_string());
    assert_eq!(
      Config::api_key_from(fallback_only, Some("file")),
      Some("fallback".into())
    );

    assert_eq!(Config::api_key_from(|_| None, Some("file")), Some("file".into()));
  }

  #[test]
  fn test_blank_api_key_is_missing() {
    assert_eq!(Config::api_key_from(|_| Some("  ".to_string()), None), None);
    assert_eq!(Config::api_key_from(|_| None, None), None);

    let blank_primary = |name: &str| match name {
      API_KEY_ENV => Some(String::new()),
      _ => Some("fallback".to_string()),
    };
    assert_eq!(Config::api_key_from(blank_primary, None), Some("fallback".into()));
  }
}
