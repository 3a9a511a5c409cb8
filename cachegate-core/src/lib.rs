//! # cachegate Core Library
//!
//! Batch cache-aside query engine sitting between callers, a key-value
//! store and an authoritative backing source.
//!
//! Given a set of lookup keys the engine returns the freshest known value
//! for each key while keeping backing-source load bounded:
//!
//! - duplicate keys are collapsed before any I/O
//! - one multi-key read against the store resolves cached entries
//! - confirmed-absent keys are occupied by mock sentinels so repeated
//!   lookups for nonexistent records never reach the source again
//!   (cache penetration protection)
//! - the remainder is loaded from the source in one batch and written
//!   back together with mocks under a shared expiry
//!
//! ## Architecture
//!
//! - **Query**: the cache-aside orchestration (`BatchCacheQuery`), the
//!   request model and the `BatchSource` strategy bundle
//! - **Front**: an optional bounded, TTL-expiring local cache layered in
//!   front of the store
//! - **Store**: the `cachegate_storage::HashStore` collaborator, one
//!   logical hash per namespace
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cachegate_core::{BatchCacheQuery, BatchRequest, QueryConfig};
//! use cachegate_storage::MemoryHashStore;
//!
//! # use cachegate_core::BatchSource;
//! # use async_trait::async_trait;
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Clone, Serialize, Deserialize)]
//! # struct User { id: u64 }
//! # struct UserSource;
//! # #[async_trait]
//! # impl BatchSource<u64, User> for UserSource {
//! #     async fn load(&self, keys: &[u64]) -> Result<Vec<User>, Box<dyn std::error::Error + Send + Sync>> {
//! #         Ok(keys.iter().map(|id| User { id: *id }).collect())
//! #     }
//! #     fn key_of(&self, value: &User) -> u64 { value.id }
//! #     fn is_valid(&self, value: &User) -> bool { value.id != 0 }
//! #     fn mock(&self) -> User { User { id: 0 } }
//! # }
//! # async fn example() -> cachegate_core::Result<()> {
//! let store = Arc::new(MemoryHashStore::new());
//! let engine = BatchCacheQuery::new(store, QueryConfig::default());
//!
//! let req = BatchRequest::new("user_list", vec![1u64, 2, 2, 3], Duration::from_secs(300));
//! let users = engine.query(&req, &UserSource).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod front;
pub mod query;

pub use error::{CacheGateError, Result};
pub use front::{FrontCache, FrontCacheConfig, FrontCacheMetricsSnapshot};
pub use query::{
    BatchCacheQuery, BatchRequest, BatchSource, QueryConfig, QueryMetrics, QueryMetricsSnapshot,
};

/// the current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
