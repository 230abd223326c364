use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::locations::location::Courier;
use crate::domain::shops::shop::Shop;

#[async_trait]
pub trait ShopRepository: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        slug: &str,
        description: &str,
        address_id: Uuid,
    ) -> anyhow::Result<Shop>;
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Shop>>;
    async fn get_by_slug(&self, slug: &str) -> anyhow::Result<Option<Shop>>;
    async fn get_by_owner(&self, user_id: Uuid) -> anyhow::Result<Option<Shop>>;
    async fn name_exists(&self, name: &str) -> anyhow::Result<bool>;
    async fn slug_exists(&self, slug: &str) -> anyhow::Result<bool>;
    async fn update(
        &self,
        shop_id: Uuid,
        description: Option<String>,
        address_id: Option<Uuid>,
    ) -> anyhow::Result<Shop>;
    // Replaces the enabled set; returns false when an id does not exist
    async fn set_couriers(&self, shop_id: Uuid, courier_ids: &[i32]) -> anyhow::Result<bool>;
    async fn list_couriers(&self, shop_id: Uuid) -> anyhow::Result<Vec<Courier>>;
    async fn find_courier(&self, shop_id: Uuid, courier_id: i32)
    -> anyhow::Result<Option<Courier>>;
}
