//! # Request Model
//!
//! 批量查询的请求模型与回源策略。
//!
//! `BatchRequest` 描述一次查询：键列表、命名空间、写回过期时间。
//! `BatchSource` 是注入的回源能力包，四个操作缺一不可：
//!
//! - `load`: 批量回源加载
//! - `key_of`: 从记录提取规范键
//! - `is_valid`: 区分真实记录与 mock 占位
//! - `mock`: 构造占位记录
//!
//! 约定：`is_valid(&mock())` 必须为 `false`，mock 只用来占住缓存槽位，
//! 永远不会出现在查询结果里。

use async_trait::async_trait;
use std::error::Error;
use std::time::Duration;

use crate::error::{CacheGateError, Result};

/// 一次批量查询的请求
///
/// 键列表允许重复，引擎在任何 I/O 之前完成去重。
/// `ttl` 为零表示本次调用不使用缓存，直接回源。
#[derive(Debug, Clone)]
pub struct BatchRequest<K> {
    /// 查询键列表，允许重复
    pub keys: Vec<K>,
    /// 命名空间，对应存储里的一个逻辑哈希表
    pub namespace: String,
    /// 写回过期时间，为零时本次调用禁用缓存
    pub ttl: Duration,
}

impl<K> BatchRequest<K> {
    /// 创建新的批量请求
    pub fn new(namespace: impl Into<String>, keys: Vec<K>, ttl: Duration) -> Self {
        Self {
            keys,
            namespace: namespace.into(),
            ttl,
        }
    }

    /// 设置写回过期时间
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// 验证请求，任何 I/O 之前调用
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(CacheGateError::configuration("namespace is empty"));
        }
        Ok(())
    }
}

/// 回源策略包
///
/// 每个可缓存的记录类型实现一次，在调用点注入。
#[async_trait]
pub trait BatchSource<K, T>: Send + Sync {
    /// 批量回源加载
    ///
    /// 只会收到缓存未能裁决的键。返回的记录数允许少于入参键数，
    /// 缺失的键由引擎以 mock 占位写回。
    async fn load(&self, keys: &[K]) -> std::result::Result<Vec<T>, Box<dyn Error + Send + Sync>>;

    /// 从记录提取规范键
    ///
    /// 缓存结果按此键归并。调用方传入的键表示（如字符串形式的数字）
    /// 不一定与记录内嵌的规范键逐字节一致，以记录为准。
    fn key_of(&self, value: &T) -> K;

    /// 真实记录返回 `true`，mock 占位返回 `false`
    fn is_valid(&self, value: &T) -> bool;

    /// 构造 mock 占位记录
    fn mock(&self) -> T;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_namespace() {
        let req: BatchRequest<u64> = BatchRequest::new("", vec![1], Duration::from_secs(60));
        assert!(matches!(
            req.validate(),
            Err(CacheGateError::Configuration(_))
        ));
    }

    #[test]
    fn test_with_ttl() {
        let req: BatchRequest<u64> =
            BatchRequest::new("users", vec![1], Duration::ZERO).with_ttl(Duration::from_secs(30));
        assert_eq!(req.ttl, Duration::from_secs(30));
        assert!(req.validate().is_ok());
    }
}
