use uuid::Uuid;

use crate::application::ports::address_repository::AddressRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::use_cases::shops::ShopError;
use crate::application::use_cases::shops::get_shop::require_own_shop;
use crate::domain::shops::shop::Shop;

pub struct UpdateShop<'a, S, A>
where
    S: ShopRepository + ?Sized,
    A: AddressRepository + ?Sized,
{
    pub shops: &'a S,
    pub addresses: &'a A,
}

impl<'a, S, A> UpdateShop<'a, S, A>
where
    S: ShopRepository + ?Sized,
    A: AddressRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        description: Option<String>,
        address_id: Option<Uuid>,
    ) -> Result<Shop, ShopError> {
        let shop = require_own_shop(self.shops, user_id).await?;
        if let Some(address_id) = address_id {
            if self
                .addresses
                .get_for_user(user_id, address_id)
                .await?
                .is_none()
            {
                return Err(ShopError::AddressNotFound);
            }
        }
        let description = description.map(|d| d.trim().to_string());
        Ok(self.shops.update(shop.id, description, address_id).await?)
    }
}
