//! # Front Cache Implementation
//!
//! 线程安全的有界 LRU + TTL 前置缓存。
//!
//! ## 特性
//!
//! - HashMap + 访问顺序队列，容量满时淘汰最久未访问条目
//! - 读取时逐条检查过期，后台任务做周期性清扫
//! - 命中率等统计可随时取快照
//!
//! ## 示例
//!
//! ```rust,no_run
//! use cachegate_core::{FrontCache, FrontCacheConfig};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let config = FrontCacheConfig::new(500, Duration::from_secs(60));
//! let cache = FrontCache::new(config);
//!
//! cache.put("user_list:1".to_string(), b"{}".to_vec(), None).await;
//! if let Some(bytes) = cache.get("user_list:1").await {
//!     println!("front hit: {} bytes", bytes.len());
//! }
//! # }
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;

use super::config::FrontCacheConfig;

/// 前置缓存统计指标
#[derive(Debug, Default)]
pub struct FrontCacheMetrics {
    /// 请求总数
    total_requests: AtomicU64,
    /// 命中次数
    hits: AtomicU64,
    /// 未命中次数
    misses: AtomicU64,
    /// 淘汰次数
    evictions: AtomicU64,
    /// 过期清理次数
    expirations: AtomicU64,
    /// 失效次数
    invalidations: AtomicU64,
}

impl FrontCacheMetrics {
    fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    fn record_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }

    fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    /// 计算命中率 (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        (self.hits.load(Ordering::Relaxed) as f64) / (total as f64)
    }

    /// 重置所有统计
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.expirations.store(0, Ordering::Relaxed);
        self.invalidations.store(0, Ordering::Relaxed);
    }
}

/// 前置缓存统计快照
#[derive(Debug, Clone, serde::Serialize)]
pub struct FrontCacheMetricsSnapshot {
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub invalidations: u64,
    pub hit_rate: f64,
}

/// 缓存条目
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    created_at: SystemTime,
    ttl: Duration,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            value,
            created_at: SystemTime::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        let elapsed = self
            .created_at
            .elapsed()
            .unwrap_or(Duration::from_secs(0));
        elapsed > self.ttl
    }
}

/// 前置缓存内部状态
#[derive(Debug)]
struct FrontCacheState {
    /// 主存储
    entries: HashMap<String, CacheEntry>,
    /// 访问顺序队列 (最久未访问 -> 最近访问)
    access_order: VecDeque<String>,
}

impl FrontCacheState {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            access_order: VecDeque::new(),
        }
    }

    /// 更新访问顺序 (移到队列尾部)
    fn touch(&mut self, key: &str) {
        self.access_order.retain(|k| k != key);
        self.access_order.push_back(key.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.access_order.retain(|k| k != key);
    }

    /// 淘汰最久未访问的条目
    fn pop_lru(&mut self) -> Option<String> {
        let key = self.access_order.pop_front()?;
        self.entries.remove(&key);
        Some(key)
    }

    fn remove_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove(key);
        }
        expired_keys.len()
    }
}

/// 有界 LRU + TTL 前置缓存
///
/// 值是编码后的字节串，与 Store 里的条目保持同一份表示。
pub struct FrontCache {
    config: FrontCacheConfig,
    state: Arc<RwLock<FrontCacheState>>,
    metrics: Arc<FrontCacheMetrics>,
}

impl FrontCache {
    /// 创建前置缓存
    pub fn new(config: FrontCacheConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(FrontCacheState::new())),
            metrics: Arc::new(FrontCacheMetrics::default()),
        }
    }

    /// 获取缓存值
    ///
    /// 命中返回字节串，未命中或已过期返回 None。
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        if !self.config.enabled {
            return None;
        }

        let mut state = self.state.write().await;
        if self.config.enable_metrics {
            self.metrics.record_request();
        }

        let found = state
            .entries
            .get(key)
            .map(|entry| (entry.is_expired(), entry.value.clone()));

        match found {
            Some((false, value)) => {
                state.touch(key);
                if self.config.enable_metrics {
                    self.metrics.record_hit();
                }
                Some(value)
            }
            Some((true, _)) => {
                // 过期，视为未命中
                state.remove(key);
                if self.config.enable_metrics {
                    self.metrics.record_miss();
                    self.metrics.record_expirations(1);
                }
                None
            }
            None => {
                if self.config.enable_metrics {
                    self.metrics.record_miss();
                }
                None
            }
        }
    }

    /// 添加或更新缓存
    ///
    /// 容量满时自动淘汰最久未访问的条目。
    ///
    /// # 参数
    /// - `ttl`: 可选的过期时间，默认使用配置的 `default_ttl`
    pub async fn put(&self, key: String, value: Vec<u8>, ttl: Option<Duration>) {
        if !self.config.enabled {
            return;
        }

        let mut state = self.state.write().await;

        if state.entries.len() >= self.config.max_entries && !state.entries.contains_key(&key) {
            if let Some(evicted) = state.pop_lru() {
                tracing::debug!("front cache evicted: {}", evicted);
                if self.config.enable_metrics {
                    self.metrics.record_eviction();
                }
            }
        }

        let ttl = ttl.unwrap_or(self.config.default_ttl);
        state.entries.insert(key.clone(), CacheEntry::new(value, ttl));
        state.touch(&key);
    }

    /// 使单个条目失效
    pub async fn invalidate(&self, key: &str) {
        if !self.config.enabled {
            return;
        }

        let mut state = self.state.write().await;
        state.remove(key);
        if self.config.enable_metrics {
            self.metrics.record_invalidation();
        }
    }

    /// 批量使条目失效
    pub async fn invalidate_batch(&self, keys: &[String]) {
        if !self.config.enabled {
            return;
        }

        let mut state = self.state.write().await;
        for key in keys {
            state.remove(key);
            if self.config.enable_metrics {
                self.metrics.record_invalidation();
            }
        }
    }

    /// 清空缓存并重置统计
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.access_order.clear();
        self.metrics.reset();
    }

    /// 当前条目数
    pub async fn len(&self) -> usize {
        let state = self.state.read().await;
        state.entries.len()
    }

    /// 是否为空
    pub async fn is_empty(&self) -> bool {
        let state = self.state.read().await;
        state.entries.is_empty()
    }

    /// 是否包含指定键 (不检查过期)
    pub async fn contains_key(&self, key: &str) -> bool {
        if !self.config.enabled {
            return false;
        }
        let state = self.state.read().await;
        state.entries.contains_key(key)
    }

    /// 移除过期条目，返回移除的数量
    ///
    /// 通常由后台清扫任务周期性调用。
    pub async fn remove_expired(&self) -> usize {
        if !self.config.enabled {
            return 0;
        }

        let mut state = self.state.write().await;
        let count = state.remove_expired();
        if count > 0 && self.config.enable_metrics {
            self.metrics.record_expirations(count as u64);
        }
        count
    }

    /// 获取配置
    pub fn config(&self) -> &FrontCacheConfig {
        &self.config
    }

    /// 获取统计快照
    pub fn get_metrics(&self) -> FrontCacheMetricsSnapshot {
        FrontCacheMetricsSnapshot {
            total_requests: self.metrics.total_requests.load(Ordering::Relaxed),
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            evictions: self.metrics.evictions.load(Ordering::Relaxed),
            expirations: self.metrics.expirations.load(Ordering::Relaxed),
            invalidations: self.metrics.invalidations.load(Ordering::Relaxed),
            hit_rate: self.metrics.hit_rate(),
        }
    }

    /// 启动后台过期清扫任务
    ///
    /// # 参数
    /// - `interval`: 清扫间隔
    pub fn start_expiration_task(
        self: Arc<Self>,
        interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            loop {
                timer.tick().await;
                let count = self.remove_expired().await;
                if count > 0 {
                    tracing::debug!("removed {} expired front cache entries", count);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with(max_entries: usize, ttl: Duration) -> FrontCache {
        FrontCache::new(FrontCacheConfig::new(max_entries, ttl))
    }

    #[tokio::test]
    async fn test_basic_get_put() {
        let cache = cache_with(10, Duration::from_secs(60));

        cache.put("k1".to_string(), b"v1".to_vec(), None).await;
        assert_eq!(cache.get("k1").await, Some(b"v1".to_vec()));
        assert_eq!(cache.get("k2").await, None);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = cache_with(3, Duration::from_secs(60));

        cache.put("k1".to_string(), b"v1".to_vec(), None).await;
        cache.put("k2".to_string(), b"v2".to_vec(), None).await;
        cache.put("k3".to_string(), b"v3".to_vec(), None).await;

        // 访问 k1，使其变为最近访问
        cache.get("k1").await;

        // 第 4 个条目应淘汰 k2
        cache.put("k4".to_string(), b"v4".to_vec(), None).await;

        assert_eq!(cache.get("k1").await, Some(b"v1".to_vec()));
        assert_eq!(cache.get("k2").await, None);
        assert_eq!(cache.get("k3").await, Some(b"v3".to_vec()));
        assert_eq!(cache.get("k4").await, Some(b"v4".to_vec()));
        assert_eq!(cache.get_metrics().evictions, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = cache_with(10, Duration::from_millis(50));

        cache.put("k1".to_string(), b"v1".to_vec(), None).await;
        assert_eq!(cache.get("k1").await, Some(b"v1".to_vec()));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get("k1").await, None);
        assert_eq!(cache.get_metrics().expirations, 1);
    }

    #[tokio::test]
    async fn test_custom_ttl() {
        let cache = cache_with(10, Duration::from_secs(60));

        cache
            .put(
                "k1".to_string(),
                b"v1".to_vec(),
                Some(Duration::from_millis(50)),
            )
            .await;
        assert_eq!(cache.get("k1").await, Some(b"v1".to_vec()));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get("k1").await, None);
    }

    #[tokio::test]
    async fn test_invalidation() {
        let cache = cache_with(10, Duration::from_secs(60));

        cache.put("k1".to_string(), b"v1".to_vec(), None).await;
        cache.put("k2".to_string(), b"v2".to_vec(), None).await;
        cache.put("k3".to_string(), b"v3".to_vec(), None).await;

        cache.invalidate("k1").await;
        cache
            .invalidate_batch(&["k2".to_string(), "k3".to_string()])
            .await;

        assert!(cache.is_empty().await);
        assert_eq!(cache.get_metrics().invalidations, 3);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = cache_with(10, Duration::from_secs(60));

        cache.put("k1".to_string(), b"v1".to_vec(), None).await;
        cache.get("k1").await;
        cache.clear().await;

        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.get_metrics().total_requests, 0);
    }

    #[tokio::test]
    async fn test_disabled_cache() {
        let config = FrontCacheConfig::default().with_enabled(false);
        let cache = FrontCache::new(config);

        cache.put("k1".to_string(), b"v1".to_vec(), None).await;
        assert_eq!(cache.get("k1").await, None);
        assert!(!cache.contains_key("k1").await);
    }

    #[tokio::test]
    async fn test_remove_expired() {
        let cache = cache_with(10, Duration::from_millis(40));

        cache.put("k1".to_string(), b"v1".to_vec(), None).await;
        cache
            .put(
                "k2".to_string(),
                b"v2".to_vec(),
                Some(Duration::from_secs(60)),
            )
            .await;

        tokio::time::sleep(Duration::from_millis(70)).await;
        let removed = cache.remove_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_hit_rate() {
        let cache = cache_with(10, Duration::from_secs(60));

        cache.put("k1".to_string(), b"v1".to_vec(), None).await;
        cache.get("k1").await;
        cache.get("k1").await;
        cache.get("miss").await;

        let metrics = cache.get_metrics();
        assert_eq!(metrics.total_requests, 3);
        assert_eq!(metrics.hits, 2);
        assert_eq!(metrics.misses, 1);
        assert!((metrics.hit_rate - 0.666).abs() < 0.01);
    }
}
