//! # Batch Cache-Aside Engine
//!
//! cache-aside 编排核心。
//!
//! ## 算法
//!
//! 1. 校验请求，空键列表直接返回空结果
//! 2. `use_cache = enabled && ttl > 0`，否则跳过缓存读写
//! 3. 去重，得到工作键集
//! 4. 读缓存：前置缓存在前，Store 的 `multi_get` 在后；
//!    每个条目按 `key_of` 重算规范键归并，`is_valid` 的进结果，
//!    不合法的 (mock) 视为确认不存在，不再回源
//! 5. 只有 Store 里完全没有的键才回源，一次 `load` 补齐
//! 6. 负缓存回填：回源没给的键以 mock 占位，与真实记录一次性写回，
//!    共享过期时间
//! 7. 归并结果返回
//!
//! ## 错误语义
//!
//! - 回源失败使本次查询整体失败，且不做任何写回，
//!   半份结果永远不会当作完整结果缓存
//! - Store 读写失败同样使查询整体失败，不退化为纯回源模式，
//!   避免悄悄掩盖 Store 故障
//! - 查无此键不是错误，结果里缺席即可

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use cachegate_storage::HashStore;

use super::config::QueryConfig;
use super::metrics::{QueryMetrics, QueryMetricsSnapshot};
use super::request::{BatchRequest, BatchSource};
use crate::error::{CacheGateError, Result};
use crate::front::FrontCache;

/// cache-aside 批量查询引擎
///
/// 持有 Store 与可选的前置缓存，回源策略在每次调用时注入。
/// 引擎本身无锁，单次查询是一条顺序流；并发查询同一缺失键时
/// 允许各自回源并写回，后写者胜，两份数据同样有效。
pub struct BatchCacheQuery {
    store: Arc<dyn HashStore>,
    front: Option<Arc<FrontCache>>,
    config: QueryConfig,
    metrics: Arc<QueryMetrics>,
}

impl BatchCacheQuery {
    /// 创建查询引擎
    pub fn new(store: Arc<dyn HashStore>, config: QueryConfig) -> Self {
        Self {
            store,
            front: None,
            config,
            metrics: Arc::new(QueryMetrics::new()),
        }
    }

    /// 挂载前置缓存
    ///
    /// 前置缓存由调用方构造并显式传入，一个逻辑命名空间共用一个实例。
    pub fn with_front_cache(mut self, front: Arc<FrontCache>) -> Self {
        self.front = Some(front);
        self
    }

    /// 获取配置
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// 获取统计快照
    pub fn get_metrics(&self) -> QueryMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn full_namespace(&self, namespace: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, namespace),
            None => namespace.to_string(),
        }
    }

    fn front_key(namespace: &str, field: &str) -> String {
        format!("{}:{}", namespace, field)
    }

    /// 批量查询
    ///
    /// # 参数
    /// - `req`: 请求，键列表允许重复，`ttl` 为零时本次调用不使用缓存
    /// - `source`: 回源策略包
    ///
    /// # 返回
    /// - `HashMap<K, T>`: 只包含 `is_valid` 成立的记录；
    ///   查无此键的键不出现在结果里
    pub async fn query<K, T>(
        &self,
        req: &BatchRequest<K>,
        source: &dyn BatchSource<K, T>,
    ) -> Result<HashMap<K, T>>
    where
        K: Eq + Hash + Clone + Display + Send + Sync,
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        req.validate()?;

        let mut result = HashMap::new();
        if req.keys.is_empty() {
            return Ok(result);
        }

        if self.config.enable_metrics {
            self.metrics.record_query(req.keys.len() as u64);
        }

        let use_cache = self.config.enabled && !req.ttl.is_zero();
        let namespace = self.full_namespace(&req.namespace);

        // 去重
        let key_set: HashSet<K> = req.keys.iter().cloned().collect();
        let mut remaining: Vec<K> = key_set.into_iter().collect();

        // 走缓存
        if use_cache {
            let cached = self.read_cached(&namespace, &remaining, source).await?;
            if !cached.is_empty() {
                remaining.retain(|k| !cached.contains_key(k));

                let mut hits = 0u64;
                let mut mocks = 0u64;
                for (key, value) in cached {
                    match value {
                        Some(v) => {
                            result.insert(key, v);
                            hits += 1;
                        }
                        // mock 占位：确认不存在，不再回源
                        None => mocks += 1,
                    }
                }
                if self.config.enable_metrics {
                    self.metrics.record_cache_hits(hits);
                    self.metrics.record_mock_hits(mocks);
                }
                debug!(
                    "cache partition for {}: {} hits, {} mocks, {} to load",
                    namespace,
                    hits,
                    mocks,
                    remaining.len()
                );
            }
        }

        if remaining.is_empty() {
            return Ok(result);
        }

        // 回源补数据
        let loaded = source
            .load(&remaining)
            .await
            .map_err(|e| CacheGateError::source(e.to_string()))?;
        if self.config.enable_metrics {
            self.metrics.record_source_load(loaded.len() as u64);
        }
        debug!(
            "source returned {} records for {} keys in {}",
            loaded.len(),
            remaining.len(),
            namespace
        );

        let mut source_map: HashMap<K, T> = HashMap::with_capacity(loaded.len());
        for value in loaded {
            source_map.insert(source.key_of(&value), value);
        }

        // 缓存数据填充：回源没给的键以 mock 占位
        if use_cache {
            let mut entries: HashMap<String, Vec<u8>> = HashMap::with_capacity(remaining.len());
            for key in &remaining {
                let bytes = match source_map.get(key) {
                    Some(value) => serde_json::to_vec(value)?,
                    None => serde_json::to_vec(&source.mock())?,
                };
                entries.insert(key.to_string(), bytes);
            }
            self.write_back(&namespace, entries, req.ttl).await?;
        }

        for (key, value) in source_map {
            if source.is_valid(&value) {
                result.insert(key, value);
            }
        }

        Ok(result)
    }

    /// 单键查询便捷入口
    ///
    /// 等价于一次单元素批量查询，写回使用配置的 `default_ttl`。
    pub async fn query_one<K, T>(
        &self,
        namespace: &str,
        key: K,
        source: &dyn BatchSource<K, T>,
    ) -> Result<Option<T>>
    where
        K: Eq + Hash + Clone + Display + Send + Sync,
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let req = BatchRequest::new(namespace, vec![key.clone()], self.config.default_ttl);
        let mut map = self.query(&req, source).await?;
        Ok(map.remove(&key))
    }

    /// 删除缓存条目
    ///
    /// Store 条目与前置缓存条目在同一次调用里先后清除，
    /// mock 占位不会在删除之后继续存活，下次查询会重新回源。
    ///
    /// # 返回
    /// - `u64`: Store 里实际删除的条目数
    pub async fn invalidate<K>(&self, namespace: &str, keys: &[K]) -> Result<u64>
    where
        K: Eq + Hash + Clone + Display + Send + Sync,
    {
        if keys.is_empty() {
            return Ok(0);
        }
        let namespace = self.full_namespace(namespace);
        let field_set: HashSet<String> = keys.iter().map(|k| k.to_string()).collect();
        let fields: Vec<String> = field_set.into_iter().collect();

        let removed = self
            .store
            .delete(&namespace, &fields)
            .await
            .map_err(|e| CacheGateError::store(e.to_string()))?;

        if let Some(front) = &self.front {
            let front_keys: Vec<String> = fields
                .iter()
                .map(|f| Self::front_key(&namespace, f))
                .collect();
            front.invalidate_batch(&front_keys).await;
        }

        if self.config.enable_metrics {
            self.metrics.record_invalidations(fields.len() as u64);
        }
        debug!(
            "invalidated {} fields in {} ({} removed from store)",
            fields.len(),
            namespace,
            removed
        );
        Ok(removed)
    }

    /// 读缓存并按规范键归并
    ///
    /// 返回值里 `Some` 为真实记录，`None` 为 mock 占位；
    /// 两者都算缓存裁决过的键，不再回源。真实记录按 `key_of`
    /// 重算的规范键归并，mock 按命中的 field 对应的查询键归并，
    /// 否则 mock 无法与当初写它的键对上。
    async fn read_cached<K, T>(
        &self,
        namespace: &str,
        keys: &[K],
        source: &dyn BatchSource<K, T>,
    ) -> Result<HashMap<K, Option<T>>>
    where
        K: Eq + Hash + Clone + Display + Send + Sync,
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let mut cached: HashMap<K, Option<T>> = HashMap::new();
        let mut store_fields: Vec<String> = Vec::with_capacity(keys.len());
        let mut lookup: HashMap<String, K> = HashMap::with_capacity(keys.len());

        match &self.front {
            Some(front) => {
                for key in keys {
                    let field = key.to_string();
                    match front.get(&Self::front_key(namespace, &field)).await {
                        Some(bytes) => {
                            let value: T = serde_json::from_slice(&bytes)?;
                            if source.is_valid(&value) {
                                cached.insert(source.key_of(&value), Some(value));
                            } else {
                                cached.insert(key.clone(), None);
                            }
                        }
                        // 本地缺失只代表未命中，继续查 Store
                        None => {
                            lookup.insert(field.clone(), key.clone());
                            store_fields.push(field);
                        }
                    }
                }
            }
            None => {
                for key in keys {
                    let field = key.to_string();
                    lookup.insert(field.clone(), key.clone());
                    store_fields.push(field);
                }
            }
        }

        if store_fields.is_empty() {
            return Ok(cached);
        }

        let pairs = self
            .store
            .multi_get(namespace, &store_fields)
            .await
            .map_err(|e| CacheGateError::store(e.to_string()))?;

        for (field, bytes) in pairs {
            let value: T = serde_json::from_slice(&bytes)?;
            if let Some(front) = &self.front {
                front
                    .put(Self::front_key(namespace, &field), bytes, None)
                    .await;
            }
            if source.is_valid(&value) {
                cached.insert(source.key_of(&value), Some(value));
            } else if let Some(key) = lookup.get(&field) {
                cached.insert(key.clone(), None);
            }
        }

        Ok(cached)
    }

    async fn write_back(
        &self,
        namespace: &str,
        entries: HashMap<String, Vec<u8>>,
        ttl: Duration,
    ) -> Result<()> {
        let count = entries.len();
        let front_entries: Option<Vec<(String, Vec<u8>)>> = self.front.as_ref().map(|_| {
            entries
                .iter()
                .map(|(field, bytes)| (Self::front_key(namespace, field), bytes.clone()))
                .collect()
        });

        self.store
            .multi_set(namespace, entries, ttl)
            .await
            .map_err(|e| CacheGateError::store(e.to_string()))?;

        // Store 写入成功后才填前置缓存，保持两层一致
        if let (Some(front), Some(front_entries)) = (&self.front, front_entries) {
            for (key, bytes) in front_entries {
                front.put(key, bytes, None).await;
            }
        }

        if self.config.enable_metrics {
            self.metrics.record_write_back();
        }
        debug!("wrote back {} entries to {}", count, namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachegate_storage::MemoryHashStore;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        user_id: u64,
        user_name: String,
    }

    impl User {
        fn new(user_id: u64, user_name: &str) -> Self {
            Self {
                user_id,
                user_name: user_name.to_string(),
            }
        }
    }

    /// 以 user_id 为键的测试回源，记录每次 load 收到的键
    struct UserSource {
        users: HashMap<u64, User>,
        load_calls: AtomicUsize,
        loaded_keys: Mutex<Vec<Vec<u64>>>,
    }

    impl UserSource {
        fn new(users: Vec<User>) -> Self {
            Self {
                users: users.into_iter().map(|u| (u.user_id, u)).collect(),
                load_calls: AtomicUsize::new(0),
                loaded_keys: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.load_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl BatchSource<u64, User> for UserSource {
        async fn load(
            &self,
            keys: &[u64],
        ) -> std::result::Result<Vec<User>, Box<dyn std::error::Error + Send + Sync>> {
            self.load_calls.fetch_add(1, Ordering::SeqCst);
            let mut sorted = keys.to_vec();
            sorted.sort_unstable();
            self.loaded_keys.lock().unwrap().push(sorted);
            Ok(keys.iter().filter_map(|k| self.users.get(k).cloned()).collect())
        }

        fn key_of(&self, value: &User) -> u64 {
            value.user_id
        }

        fn is_valid(&self, value: &User) -> bool {
            value.user_id != 0
        }

        fn mock(&self) -> User {
            User::new(0, "")
        }
    }

    fn engine() -> (BatchCacheQuery, Arc<MemoryHashStore>) {
        let store = Arc::new(MemoryHashStore::new());
        let engine = BatchCacheQuery::new(store.clone(), QueryConfig::default());
        (engine, store)
    }

    fn req(keys: Vec<u64>) -> BatchRequest<u64> {
        BatchRequest::new("user_list", keys, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_empty_keys() {
        let (engine, _) = engine();
        let source = UserSource::new(vec![]);
        let result = engine.query(&req(vec![]), &source).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_first_query_loads_and_fills_cache() {
        let (engine, store) = engine();
        let source = UserSource::new(vec![User::new(1, "alice"), User::new(2, "bob")]);

        let result = engine.query(&req(vec![1, 2]), &source).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[&1], User::new(1, "alice"));
        assert_eq!(source.calls(), 1);
        assert_eq!(store.field_count("user_list"), 2);

        // 第二次查询走缓存，不回源
        let result = engine.query(&req(vec![1, 2]), &source).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_negative_caching() {
        let (engine, store) = engine();
        let source = UserSource::new(vec![]);

        // 第一次：回源一次，结果为空，写入 mock
        let result = engine.query(&req(vec![42]), &source).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(source.calls(), 1);
        assert_eq!(store.field_count("user_list"), 1);

        // 第二次：mock 命中，不再回源，结果仍为空
        let result = engine.query(&req(vec![42]), &source).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(source.calls(), 1);

        let metrics = engine.get_metrics();
        assert_eq!(metrics.mock_hits, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_bypasses_cache() {
        let (engine, store) = engine();
        let source = UserSource::new(vec![User::new(1, "alice")]);

        let req = BatchRequest::new("user_list", vec![1, 1], Duration::ZERO);
        let result = engine.query(&req, &source).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(source.calls(), 1);
        // 不写缓存
        assert_eq!(store.field_count("user_list"), 0);

        let result = engine.query(&req, &source).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_disabled_engine_bypasses_cache() {
        let store = Arc::new(MemoryHashStore::new());
        let engine = BatchCacheQuery::new(
            store.clone(),
            QueryConfig::default().with_enabled(false),
        );
        let source = UserSource::new(vec![User::new(1, "alice")]);

        let result = engine.query(&req(vec![1]), &source).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(store.field_count("user_list"), 0);
    }

    #[tokio::test]
    async fn test_dedup_before_io() {
        let (engine, _) = engine();
        let source = UserSource::new(vec![User::new(1, "alice"), User::new(2, "bob")]);

        let result = engine.query(&req(vec![1, 1, 2]), &source).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(source.calls(), 1);
        assert_eq!(source.loaded_keys.lock().unwrap()[0], vec![1, 2]);
    }

    #[tokio::test]
    async fn test_key_prefix() {
        let store = Arc::new(MemoryHashStore::new());
        let engine = BatchCacheQuery::new(
            store.clone(),
            QueryConfig::default().with_key_prefix("prod".to_string()),
        );
        let source = UserSource::new(vec![User::new(1, "alice")]);

        engine.query(&req(vec![1]), &source).await.unwrap();
        assert_eq!(store.field_count("prod:user_list"), 1);
        assert_eq!(store.field_count("user_list"), 0);
    }

    #[tokio::test]
    async fn test_query_one() {
        let (engine, _) = engine();
        let source = UserSource::new(vec![User::new(7, "grace")]);

        let user = engine.query_one("user_list", 7, &source).await.unwrap();
        assert_eq!(user, Some(User::new(7, "grace")));

        let missing = engine.query_one("user_list", 8, &source).await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_invalidate_removes_mock() {
        let (engine, store) = engine();
        let source = UserSource::new(vec![]);

        engine.query(&req(vec![5]), &source).await.unwrap();
        assert_eq!(store.field_count("user_list"), 1);
        assert_eq!(source.calls(), 1);

        let removed = engine.invalidate("user_list", &[5u64]).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.field_count("user_list"), 0);

        // mock 被删掉之后重新回源
        engine.query(&req(vec![5]), &source).await.unwrap();
        assert_eq!(source.calls(), 2);
    }
}
