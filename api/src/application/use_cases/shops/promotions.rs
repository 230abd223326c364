use uuid::Uuid;

use crate::application::ports::cache_port::CachePort;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::services::cache;
use crate::application::use_cases::shops::get_shop::require_own_shop;
use crate::application::use_cases::shops::{ShopError, validate_discount};
use crate::domain::pricing::{Discount, DiscountType};
use crate::domain::products::product::{NewPromotion, Promotion};

pub struct CreatePromotion<'a, S, P, C>
where
    S: ShopRepository + ?Sized,
    P: ProductRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub shops: &'a S,
    pub products: &'a P,
    pub cache: &'a C,
}

impl<'a, S, P, C> CreatePromotion<'a, S, P, C>
where
    S: ShopRepository + ?Sized,
    P: ProductRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, mut input: NewPromotion) -> Result<Promotion, ShopError> {
        let shop = require_own_shop(self.shops, user_id).await?;
        input.name = input.name.trim().to_string();
        if input.name.is_empty() {
            return Err(ShopError::InvalidInput("name is required".into()));
        }
        if input.discount_type == DiscountType::Shipping {
            return Err(ShopError::InvalidInput(
                "promotions only support percent or nominal discounts".into(),
            ));
        }
        let discount = Discount {
            kind: input.discount_type,
            amount: input.amount,
        };
        validate_discount(&discount, input.start_at, input.end_at).map_err(ShopError::InvalidInput)?;
        let product = self
            .products
            .get_owned(shop.id, input.product_id)
            .await?
            .ok_or(ShopError::ProductNotFound)?;
        let promotion = self.products.create_promotion(shop.id, &input).await?;
        cache::invalidate(self.cache, &cache::product_key(&product.slug)).await;
        Ok(promotion)
    }
}

pub struct ListPromotions<'a, S, P>
where
    S: ShopRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub shops: &'a S,
    pub products: &'a P,
}

impl<'a, S, P> ListPromotions<'a, S, P>
where
    S: ShopRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Promotion>, ShopError> {
        let shop = require_own_shop(self.shops, user_id).await?;
        Ok(self.products.list_promotions(shop.id).await?)
    }
}
