use async_trait::async_trait;

use crate::domain::marketplace::banner::{Banner, NewBanner};

#[async_trait]
pub trait BannerRepository: Send + Sync {
    async fn create(&self, banner: &NewBanner) -> anyhow::Result<Banner>;
    async fn list_active(&self, now: chrono::DateTime<chrono::Utc>) -> anyhow::Result<Vec<Banner>>;
}
