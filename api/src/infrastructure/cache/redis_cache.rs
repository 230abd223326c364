use anyhow::Context;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::application::ports::cache_port::CachePort;

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url).context("redis_open")?;
        let conn = client
            .get_connection_manager()
            .await
            .context("redis_connection_manager")?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CachePort for RedisCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await.context("redis_get")?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key, value, ttl_secs)
            .await
            .context("redis_set_ex")?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.del(key).await.context("redis_del")?;
        Ok(())
    }

    async fn incr(&self, key: &str, ttl_secs: u64) -> anyhow::Result<i64> {
        let mut conn = self.conn.clone();
        let n: i64 = conn.incr(key, 1).await.context("redis_incr")?;
        if n == 1 {
            let _: bool = conn
                .expire(key, ttl_secs as i64)
                .await
                .context("redis_expire")?;
        }
        Ok(n)
    }
}
