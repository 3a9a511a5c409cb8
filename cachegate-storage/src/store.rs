use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::time::Duration;

/// 命名空间哈希存储。
///
/// 一个 namespace 对应后端的一个逻辑哈希表，field 为表内的键。
/// 过期时间作用于整个 namespace，每次 `multi_set` 会刷新。
#[async_trait]
pub trait HashStore: Send + Sync {
    fn name(&self) -> &str;

    /// 批量读取。只返回存在的条目，以 (field, value) 对给出，顺序不保证；
    /// 不存在的 field 不会以任何占位形式出现在结果里。
    async fn multi_get(
        &self,
        namespace: &str,
        fields: &[String],
    ) -> Result<Vec<(String, Vec<u8>)>, Box<dyn Error + Send + Sync>>;

    /// 批量写入，整个 map 共享一个过期时间。
    /// `ttl` 为零表示不过期。部分失败必须以整体失败上报。
    async fn multi_set(
        &self,
        namespace: &str,
        entries: HashMap<String, Vec<u8>>,
        ttl: Duration,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// 删除若干 field，返回实际删除的数量。
    async fn delete(
        &self,
        namespace: &str,
        fields: &[String],
    ) -> Result<u64, Box<dyn Error + Send + Sync>>;

    async fn exists(
        &self,
        namespace: &str,
        field: &str,
    ) -> Result<bool, Box<dyn Error + Send + Sync>>;

    async fn health_check(&self) -> bool;
}
