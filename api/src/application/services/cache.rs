use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::application::ports::cache_port::CachePort;

pub fn product_key(slug: &str) -> String {
    format!("product:{}", slug)
}

pub const PROVINCES_KEY: &str = "locations:provinces";

pub fn cities_key(province_id: i32) -> String {
    format!("locations:cities:{}", province_id)
}

pub fn step_up_key(user_id: Uuid) -> String {
    format!("auth:step_up:{}", user_id)
}

/// Cache reads never fail a request: errors and undecodable values are misses.
pub async fn get_json<C, T>(cache: &C, key: &str) -> Option<T>
where
    C: CachePort + ?Sized,
    T: DeserializeOwned,
{
    match cache.get(key).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key, error = ?e, "cache_get_failed");
            None
        }
    }
}

pub async fn set_json<C, T>(cache: &C, key: &str, value: &T, ttl_secs: u64)
where
    C: CachePort + ?Sized,
    T: Serialize,
{
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = ?e, "cache_encode_failed");
            return;
        }
    };
    if let Err(e) = cache.set(key, &raw, ttl_secs).await {
        tracing::warn!(key, error = ?e, "cache_set_failed");
    }
}

pub async fn invalidate<C: CachePort + ?Sized>(cache: &C, key: &str) {
    if let Err(e) = cache.delete(key).await {
        tracing::warn!(key, error = ?e, "cache_delete_failed");
    }
}
