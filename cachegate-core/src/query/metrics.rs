//! # Query Metrics
//!
//! 查询引擎统计指标。

use std::sync::atomic::{AtomicU64, Ordering};

/// 查询统计指标
#[derive(Debug, Default)]
pub struct QueryMetrics {
    /// 查询总数
    total_queries: AtomicU64,
    /// 请求键总数 (去重前)
    keys_requested: AtomicU64,
    /// 缓存命中的键数 (真实记录)
    cache_hits: AtomicU64,
    /// mock 命中的键数 (确认不存在，未回源)
    mock_hits: AtomicU64,
    /// 回源调用次数
    source_loads: AtomicU64,
    /// 回源加载的记录数
    keys_loaded: AtomicU64,
    /// 写回次数
    write_backs: AtomicU64,
    /// 失效的键数
    invalidations: AtomicU64,
}

impl QueryMetrics {
    /// 创建新的统计实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次查询
    pub fn record_query(&self, keys: u64) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        self.keys_requested.fetch_add(keys, Ordering::Relaxed);
    }

    /// 记录缓存命中
    pub fn record_cache_hits(&self, count: u64) {
        self.cache_hits.fetch_add(count, Ordering::Relaxed);
    }

    /// 记录 mock 命中
    pub fn record_mock_hits(&self, count: u64) {
        self.mock_hits.fetch_add(count, Ordering::Relaxed);
    }

    /// 记录一次回源
    pub fn record_source_load(&self, loaded: u64) {
        self.source_loads.fetch_add(1, Ordering::Relaxed);
        self.keys_loaded.fetch_add(loaded, Ordering::Relaxed);
    }

    /// 记录一次写回
    pub fn record_write_back(&self) {
        self.write_backs.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录失效
    pub fn record_invalidations(&self, count: u64) {
        self.invalidations.fetch_add(count, Ordering::Relaxed);
    }

    /// 计算键级命中率 (0.0 - 1.0)
    ///
    /// mock 命中也算命中：它同样避免了一次回源。
    pub fn hit_rate(&self) -> f64 {
        let requested = self.keys_requested.load(Ordering::Relaxed);
        if requested == 0 {
            return 0.0;
        }
        let hits = self.cache_hits.load(Ordering::Relaxed)
            + self.mock_hits.load(Ordering::Relaxed);
        (hits as f64) / (requested as f64)
    }

    /// 重置所有统计
    pub fn reset(&self) {
        self.total_queries.store(0, Ordering::Relaxed);
        self.keys_requested.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.mock_hits.store(0, Ordering::Relaxed);
        self.source_loads.store(0, Ordering::Relaxed);
        self.keys_loaded.store(0, Ordering::Relaxed);
        self.write_backs.store(0, Ordering::Relaxed);
        self.invalidations.store(0, Ordering::Relaxed);
    }

    /// 获取统计快照
    pub fn snapshot(&self) -> QueryMetricsSnapshot {
        QueryMetricsSnapshot {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            keys_requested: self.keys_requested.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            mock_hits: self.mock_hits.load(Ordering::Relaxed),
            source_loads: self.source_loads.load(Ordering::Relaxed),
            keys_loaded: self.keys_loaded.load(Ordering::Relaxed),
            write_backs: self.write_backs.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            hit_rate: self.hit_rate(),
        }
    }
}

/// 查询统计快照
#[derive(Debug, Clone, serde::Serialize)]
pub struct QueryMetricsSnapshot {
    pub total_queries: u64,
    pub keys_requested: u64,
    pub cache_hits: u64,
    pub mock_hits: u64,
    pub source_loads: u64,
    pub keys_loaded: u64,
    pub write_backs: u64,
    pub invalidations: u64,
    pub hit_rate: f64,
}
