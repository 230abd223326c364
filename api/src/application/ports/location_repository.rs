use async_trait::async_trait;

use crate::domain::locations::location::{City, Courier, Province};

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn list_provinces(&self) -> anyhow::Result<Vec<Province>>;
    async fn list_cities(&self, province_id: i32) -> anyhow::Result<Vec<City>>;
    async fn get_city(&self, city_id: i32) -> anyhow::Result<Option<City>>;
    async fn list_couriers(&self) -> anyhow::Result<Vec<Courier>>;
}
