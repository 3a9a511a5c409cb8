//! # Front Cache Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 前置缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontCacheConfig {
    /// 是否启用
    pub enabled: bool,

    /// 最大条目数
    ///
    /// 超出时按 LRU 淘汰。本层是热点加速层，
    /// 容量远小于 Store，建议值：100 - 5000。
    pub max_entries: usize,

    /// 默认过期时间
    ///
    /// 本层的过期时间独立于 Store 的 TTL，且应明显更短，
    /// 保证 Store 更新能在本层及时可见。
    pub default_ttl: Duration,

    /// 是否启用统计信息收集
    pub enable_metrics: bool,
}

impl Default for FrontCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1000,
            default_ttl: Duration::from_secs(120), // 2 分钟
            enable_metrics: true,
        }
    }
}

impl FrontCacheConfig {
    /// 创建新的前置缓存配置
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            enabled: true,
            max_entries,
            default_ttl,
            enable_metrics: true,
        }
    }

    /// 设置是否启用
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// 设置最大条目数
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// 设置默认过期时间
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// 设置是否启用统计信息收集
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// 验证配置是否有效
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }

        if self.max_entries > 100_000 {
            return Err("max_entries is too large (max: 100000)".to_string());
        }

        if self.default_ttl.is_zero() {
            return Err("default_ttl must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FrontCacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = FrontCacheConfig::default()
            .with_enabled(false)
            .with_max_entries(100)
            .with_default_ttl(Duration::from_secs(30))
            .with_metrics(false);

        assert!(!config.enabled);
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.default_ttl, Duration::from_secs(30));
        assert!(!config.enable_metrics);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(FrontCacheConfig::new(0, Duration::from_secs(60))
            .validate()
            .is_err());
        assert!(FrontCacheConfig::new(200_000, Duration::from_secs(60))
            .validate()
            .is_err());
        assert!(FrontCacheConfig::new(100, Duration::ZERO)
            .validate()
            .is_err());
    }
}
