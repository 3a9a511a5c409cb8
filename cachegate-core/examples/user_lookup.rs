//! # 批量用户查询示例
//!
//! 展示引擎的完整用法：批量查询、负缓存、前置缓存与失效。
//!
//! ## 运行方式
//!
//! ```bash
//! cargo run --example user_lookup
//! ```

use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cachegate_core::{
    BatchCacheQuery, BatchRequest, BatchSource, FrontCache, FrontCacheConfig, QueryConfig,
};
use cachegate_storage::MemoryHashStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    user_id: u64,
    user_name: String,
}

/// 模拟数据库：只有 1 和 2 两个用户
struct UserDirectory {
    rows: HashMap<u64, User>,
    load_calls: AtomicUsize,
}

impl UserDirectory {
    fn new() -> Self {
        let rows = [
            (
                1,
                User {
                    user_id: 1,
                    user_name: "alice".to_string(),
                },
            ),
            (
                2,
                User {
                    user_id: 2,
                    user_name: "bob".to_string(),
                },
            ),
        ]
        .into_iter()
        .collect();
        Self {
            rows,
            load_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BatchSource<u64, User> for UserDirectory {
    async fn load(&self, keys: &[u64]) -> Result<Vec<User>, Box<dyn Error + Send + Sync>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        println!("   -> database load for keys: {:?}", keys);
        Ok(keys
            .iter()
            .filter_map(|k| self.rows.get(k).cloned())
            .collect())
    }

    fn key_of(&self, value: &User) -> u64 {
        value.user_id
    }

    fn is_valid(&self, value: &User) -> bool {
        value.user_id != 0
    }

    fn mock(&self) -> User {
        User {
            user_id: 0,
            user_name: String::new(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cachegate_core=debug")),
        )
        .init();

    println!("=== cachegate user lookup example ===\n");

    let store = Arc::new(MemoryHashStore::new());
    let front = Arc::new(FrontCache::new(FrontCacheConfig::new(
        100,
        Duration::from_secs(120),
    )));
    let engine = BatchCacheQuery::new(store, QueryConfig::default()).with_front_cache(front);
    let directory = UserDirectory::new();

    // 1. 第一次批量查询：全部回源，一次性写回
    println!("1. First batch query for [1, 2, 99]...");
    let req = BatchRequest::new("user_list", vec![1, 2, 99], Duration::from_secs(300));
    let users = engine.query(&req, &directory).await?;
    println!("   result: {:?}\n", users);

    // 2. 第二次查询：1 和 2 命中缓存，99 命中 mock 占位，不再回源
    println!("2. Second batch query for [1, 2, 99]...");
    let users = engine.query(&req, &directory).await?;
    println!("   result: {:?}", users);
    println!(
        "   database loads so far: {}\n",
        directory.load_calls.load(Ordering::SeqCst)
    );

    // 3. 单键便捷入口
    println!("3. query_one for user 1...");
    let user = engine.query_one("user_list", 1u64, &directory).await?;
    println!("   result: {:?}\n", user);

    // 4. 失效后重新回源
    println!("4. Invalidating user 99 and querying again...");
    engine.invalidate("user_list", &[99u64]).await?;
    let users = engine.query(&req, &directory).await?;
    println!("   result: {:?}", users);
    println!(
        "   database loads so far: {}\n",
        directory.load_calls.load(Ordering::SeqCst)
    );

    // 5. 统计
    let metrics = engine.get_metrics();
    println!("5. Engine metrics: {}", serde_json::to_string_pretty(&metrics)?);

    Ok(())
}
