use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::users::user::{Address, NewAddress};

#[async_trait]
pub trait AddressRepository: Send + Sync {
    // Default first, then newest
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Address>>;
    async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Address>>;
    // None when the user already has `max` addresses; the first address becomes the default
    async fn create(
        &self,
        user_id: Uuid,
        address: &NewAddress,
        max: i64,
    ) -> anyhow::Result<Option<Address>>;
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        address: &NewAddress,
    ) -> anyhow::Result<Option<Address>>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
    // Clears the previous default in the same transaction
    async fn set_default(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}
