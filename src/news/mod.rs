//! News API access: request building, the approach fallback chain, response
//! normalization, and the cached client the app talks to.

pub mod api_types;
pub mod cached_client;
pub mod client;
pub mod envelope;
pub mod error;
pub mod strategy;
pub mod transport;
pub mod types;

pub use cached_client::{CachedNewsClient, Retrieved};
pub use client::NewsClient;
pub use error::NewsError;
pub use types::Article;
