use uuid::Uuid;

use crate::application::ports::shop_repository::ShopRepository;
use crate::application::use_cases::shops::ShopError;
use crate::application::use_cases::shops::get_shop::require_own_shop;
use crate::domain::locations::location::Courier;

pub struct SetShopCouriers<'a, S: ShopRepository + ?Sized> {
    pub shops: &'a S,
}

impl<'a, S: ShopRepository + ?Sized> SetShopCouriers<'a, S> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        mut courier_ids: Vec<i32>,
    ) -> Result<Vec<Courier>, ShopError> {
        let shop = require_own_shop(self.shops, user_id).await?;
        courier_ids.sort_unstable();
        courier_ids.dedup();
        if courier_ids.is_empty() {
            return Err(ShopError::InvalidInput("enable at least one courier".into()));
        }
        if !self.shops.set_couriers(shop.id, &courier_ids).await? {
            return Err(ShopError::CourierNotFound);
        }
        Ok(self.shops.list_couriers(shop.id).await?)
    }
}
