//! # Query Module
//!
//! cachegate 的批量缓存查询层实现。
//!
//! ## 模块结构
//!
//! - `config`: 查询引擎配置
//! - `request`: 请求模型与回源策略
//! - `engine`: cache-aside 编排核心
//! - `metrics`: 查询统计
//!
//! ## 特性
//!
//! - 批量键去重，I/O 成本以去重后键数为上界
//! - 负缓存：确认不存在的键写入 mock 占位，杜绝缓存穿透
//! - 规范键归一：缓存结果按记录自身携带的键归并，
//!   不依赖与入参键列表的位置对应
//! - 批量回填：真实记录与 mock 一次性写回，共享过期时间
//!
//! ## 示例
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
//! let req = BatchRequest::new("user_list", vec![1u64, 2, 3], Duration::from_secs(300));
//! let result = engine.query(&req, &UserSource).await?;
//!
//! // 获取统计
//! let metrics = engine.get_metrics();
//! println!("Hit rate: {:.2}%", metrics.hit_rate * 100.0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod metrics;
pub mod request;

pub use config::QueryConfig;
pub use engine::BatchCacheQuery;
pub use metrics::{QueryMetrics, QueryMetricsSnapshot};
pub use request::{BatchRequest, BatchSource};
