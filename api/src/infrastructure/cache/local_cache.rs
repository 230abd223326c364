use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::application::ports::cache_port::CachePort;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Single-process cache used when no Redis is configured. Expired entries
/// are dropped lazily on access.
#[derive(Default)]
pub struct LocalCache {
    entries: DashMap<String, Entry>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CachePort for LocalCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries.remove_if(key, |_, e| e.is_expired(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> anyhow::Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str, ttl_secs: u64) -> anyhow::Result<i64> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: "0".into(),
            expires_at: now + Duration::from_secs(ttl_secs),
        });
        if entry.is_expired(now) {
            entry.value = "0".into();
            entry.expires_at = now + Duration::from_secs(ttl_secs);
        }
        let next = entry.value.parse::<i64>().unwrap_or(0) + 1;
        entry.value = next.to_string();
        Ok(next)
    }
}
