use std::sync::Arc;

use crate::application::ports::cache_port::CachePort;

pub mod local_cache;
pub mod redis_cache;

/// Redis when `redis_url` is configured, otherwise an in-process map.
pub async fn build_cache(redis_url: Option<&str>) -> anyhow::Result<Arc<dyn CachePort>> {
    match redis_url {
        Some(url) => {
            let cache = redis_cache::RedisCache::connect(url).await?;
            tracing::info!("cache_backend_redis");
            Ok(Arc::new(cache))
        }
        None => {
            tracing::info!("cache_backend_local");
            Ok(Arc::new(local_cache::LocalCache::new()))
        }
    }
}
