//! # Front Cache Module
//!
//! Store 之前的本地前置缓存层。
//!
//! ## 模块结构
//!
//! - `config`: 前置缓存配置
//! - `cache`: 有界 LRU + TTL 实现
//!
//! ## 语义约定
//!
//! - 本地缺失只代表未命中，查询继续落到 Store
//! - mock 占位以普通条目流经本层，本层不需要独立的负缓存逻辑
//! - 实例由调用方构造并显式传给引擎，一个逻辑命名空间一个实例，
//!   不做进程级全局状态
//! - 删除路径与 Store 一起失效，见 `BatchCacheQuery::invalidate`

pub mod cache;
pub mod config;

pub use cache::{FrontCache, FrontCacheMetrics, FrontCacheMetricsSnapshot};
pub use config::FrontCacheConfig;
