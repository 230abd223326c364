use async_trait::async_trait;

#[async_trait]
pub trait CachePort: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
    /// Increments a counter, starting the TTL when the key is created.
    async fn incr(&self, key: &str, ttl_secs: u64) -> anyhow::Result<i64>;
}
