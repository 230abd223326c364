use uuid::Uuid;

use crate::application::ports::cache_port::CachePort;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::services::cache;
use crate::application::use_cases::products::ProductError;
use crate::domain::pricing;
use crate::domain::products::product::{Product, ProductUpdate, Sku, SkuUpdate};
use crate::domain::shops::shop::Shop;

pub struct UpdateProduct<'a, S, P, C>
where
    S: ShopRepository + ?Sized,
    P: ProductRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub shops: &'a S,
    pub products: &'a P,
    pub cache: &'a C,
}

impl<'a, S, P, C> UpdateProduct<'a, S, P, C>
where
    S: ShopRepository + ?Sized,
    P: ProductRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub async fn product(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        mut update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        let shop = self.own_shop(user_id).await?;
        if let Some(name) = update.name.as_mut() {
            *name = name.trim().to_string();
            if name.chars().count() < 3 || name.chars().count() > 120 {
                return Err(ProductError::InvalidInput("name must be 3-120 characters".into()));
            }
        }
        let product = self
            .products
            .update_product(shop.id, product_id, &update)
            .await?
            .ok_or(ProductError::NotFound)?;
        cache::invalidate(self.cache, &cache::product_key(&product.slug)).await;
        Ok(product)
    }

    pub async fn sku(
        &self,
        user_id: Uuid,
        sku_id: Uuid,
        update: SkuUpdate,
    ) -> Result<Sku, ProductError> {
        let shop = self.own_shop(user_id).await?;
        if matches!(update.price, Some(p) if !pricing::is_storable_price(p)) {
            return Err(ProductError::InvalidInput(
                "sku price must be positive with at most two decimals".into(),
            ));
        }
        if matches!(update.stock, Some(s) if s < 0) {
            return Err(ProductError::InvalidInput("sku stock must not be negative".into()));
        }
        let (sku, slug) = self
            .products
            .update_sku(shop.id, sku_id, &update)
            .await?
            .ok_or(ProductError::SkuNotFound)?;
        cache::invalidate(self.cache, &cache::product_key(&slug)).await;
        Ok(sku)
    }

    async fn own_shop(&self, user_id: Uuid) -> Result<Shop, ProductError> {
        self.shops
            .get_by_owner(user_id)
            .await?
            .ok_or(ProductError::ShopRequired)
    }
}
