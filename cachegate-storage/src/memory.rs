use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

use crate::store::HashStore;

struct NamespaceEntry {
    fields: HashMap<String, Vec<u8>>,
    expires_at: Option<SystemTime>,
}

impl NamespaceEntry {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => SystemTime::now() >= deadline,
            None => false,
        }
    }
}

pub struct MemoryHashStore {
    data: RwLock<HashMap<String, NamespaceEntry>>,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// 当前 namespace 下未过期的 field 数量，测试用。
    pub fn field_count(&self, namespace: &str) -> usize {
        let data = self.data.read().unwrap();
        match data.get(namespace) {
            Some(entry) if !entry.is_expired() => entry.fields.len(),
            _ => 0,
        }
    }
}

impl Default for MemoryHashStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HashStore for MemoryHashStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn multi_get(
        &self,
        namespace: &str,
        fields: &[String],
    ) -> Result<Vec<(String, Vec<u8>)>, Box<dyn Error + Send + Sync>> {
        let data = self.data.read().unwrap();
        let entry = match data.get(namespace) {
            Some(entry) if !entry.is_expired() => entry,
            _ => return Ok(Vec::new()),
        };
        Ok(fields
            .iter()
            .filter_map(|f| entry.fields.get(f).map(|v| (f.clone(), v.clone())))
            .collect())
    }

    async fn multi_set(
        &self,
        namespace: &str,
        entries: HashMap<String, Vec<u8>>,
        ttl: Duration,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut data = self.data.write().unwrap();
        let entry = data
            .entry(namespace.to_string())
            .or_insert_with(|| NamespaceEntry {
                fields: HashMap::new(),
                expires_at: None,
            });
        if entry.is_expired() {
            entry.fields.clear();
        }
        entry.fields.extend(entries);
        // 与 Redis 的 HSET + EXPIRE 语义一致：每次写入刷新整个哈希的过期时间
        entry.expires_at = if ttl.is_zero() {
            None
        } else {
            Some(SystemTime::now() + ttl)
        };
        Ok(())
    }

    async fn delete(
        &self,
        namespace: &str,
        fields: &[String],
    ) -> Result<u64, Box<dyn Error + Send + Sync>> {
        let mut data = self.data.write().unwrap();
        if data.get(namespace).map_or(true, |e| e.is_expired()) {
            data.remove(namespace);
            return Ok(0);
        }
        let mut removed = 0;
        let mut now_empty = false;
        if let Some(entry) = data.get_mut(namespace) {
            for field in fields {
                if entry.fields.remove(field).is_some() {
                    removed += 1;
                }
            }
            now_empty = entry.fields.is_empty();
        }
        if now_empty {
            data.remove(namespace);
        }
        Ok(removed)
    }

    async fn exists(
        &self,
        namespace: &str,
        field: &str,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let data = self.data.read().unwrap();
        Ok(match data.get(namespace) {
            Some(entry) if !entry.is_expired() => entry.fields.contains_key(field),
            _ => false,
        })
    }

    async fn health_check(&self) -> bool {
        true
    }
}
