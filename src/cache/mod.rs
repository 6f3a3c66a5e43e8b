//! Date-keyed article cache.
//!
//! This module provides:
//! - A persistent SQLite store with one row per day
//! - Lazy expiry: an entry older than the TTL is deleted by the read that finds it
//! - A cache-first layer that only writes after a fetch fully succeeds
//!
//! Storage errors never escape this module; a broken cache behaves like an
//! empty one.

mod clock;
mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{NoopStorage, SqliteStorage, DEFAULT_TTL_HOURS};
pub use traits::{CacheResult, CacheSource, CacheStore};

#[cfg(test)]
pub(crate) use clock::ManualClock;
#[cfg(test)]
pub(crate) use layer::testing::RecordingStore;
