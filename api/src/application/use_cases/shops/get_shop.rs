use uuid::Uuid;

use crate::application::ports::shop_repository::ShopRepository;
use crate::application::use_cases::shops::ShopError;
use crate::domain::locations::location::Courier;
use crate::domain::shops::shop::Shop;

#[derive(Debug, Clone)]
pub struct ShopProfile {
    pub shop: Shop,
    pub couriers: Vec<Courier>,
}

pub struct GetShop<'a, S: ShopRepository + ?Sized> {
    pub shops: &'a S,
}

impl<'a, S: ShopRepository + ?Sized> GetShop<'a, S> {
    pub async fn by_slug(&self, slug: &str) -> Result<ShopProfile, ShopError> {
        let shop = self
            .shops
            .get_by_slug(slug)
            .await?
            .ok_or(ShopError::NotFound)?;
        self.with_couriers(shop).await
    }

    pub async fn mine(&self, user_id: Uuid) -> Result<ShopProfile, ShopError> {
        let shop = require_own_shop(self.shops, user_id).await?;
        self.with_couriers(shop).await
    }

    async fn with_couriers(&self, shop: Shop) -> Result<ShopProfile, ShopError> {
        let couriers = self.shops.list_couriers(shop.id).await?;
        Ok(ShopProfile { shop, couriers })
    }
}

/// The caller's shop; seller endpoints answer 404 when there is none.
pub async fn require_own_shop<S: ShopRepository + ?Sized>(
    shops: &S,
    user_id: Uuid,
) -> Result<Shop, ShopError> {
    shops
        .get_by_owner(user_id)
        .await?
        .ok_or(ShopError::NotFound)
}
