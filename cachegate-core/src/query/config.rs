//! # Query Configuration
//!
//! 查询引擎配置管理模块。
//!
//! ## 配置选项
//!
//! - `enabled`: 是否启用缓存路径
//! - `default_ttl`: 默认写回过期时间 (供单键查询等未显式给出 TTL 的入口使用)
//! - `key_prefix`: 命名空间前缀 (用于实例隔离)
//! - `enable_metrics`: 是否启用统计信息收集

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 查询引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// 是否启用缓存路径
    ///
    /// 全局开关。关闭后所有查询直接回源，不读也不写缓存。
    pub enabled: bool,

    /// 默认写回过期时间
    ///
    /// `query_one` 等便捷入口使用此值；批量请求自带 TTL。
    /// 建议值：60s - 600s，根据数据更新频率调整。
    pub default_ttl: Duration,

    /// 命名空间前缀
    ///
    /// 用于实例隔离，防止不同应用或环境的缓存冲突。
    /// 示例：`"prod"`, `"node-1"`
    pub key_prefix: Option<String>,

    /// 是否启用统计信息收集
    pub enable_metrics: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: Duration::from_secs(300), // 5 分钟
            key_prefix: None,
            enable_metrics: true,
        }
    }
}

impl QueryConfig {
    /// 创建新的查询配置
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            enabled: true,
            default_ttl,
            key_prefix: None,
            enable_metrics: true,
        }
    }

    /// 设置是否启用缓存路径
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// 设置默认写回过期时间
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// 设置命名空间前缀
    pub fn with_key_prefix(mut self, prefix: String) -> Self {
        self.key_prefix = Some(prefix);
        self
    }

    /// 设置是否启用统计信息收集
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// 验证配置是否有效
    ///
    /// # 返回
    /// - `Result<(), String>`: 配置无效时返回错误描述
    pub fn validate(&self) -> Result<(), String> {
        if self.default_ttl.as_secs() == 0 {
            return Err("default_ttl must be greater than 0".to_string());
        }

        if self.default_ttl.as_secs() > 86400 {
            return Err("default_ttl is too large (max: 86400s = 1 day)".to_string());
        }

        if let Some(prefix) = &self.key_prefix {
            if prefix.is_empty() || prefix.contains(':') {
                return Err("key_prefix must be non-empty and must not contain ':'".to_string());
            }
        }

        Ok(())
    }

    /// 创建用于测试环境的配置
    ///
    /// 特点：关闭缓存路径，每次查询都回源。
    pub fn testing() -> Self {
        Self {
            enabled: false,
            default_ttl: Duration::from_secs(1),
            key_prefix: Some("test".to_string()),
            enable_metrics: false,
        }
    }

    /// 创建用于生产环境的配置
    pub fn production() -> Self {
        Self {
            enabled: true,
            default_ttl: Duration::from_secs(600),
            key_prefix: None,
            enable_metrics: true,
        }
    }
}
