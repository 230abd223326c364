use uuid::Uuid;

use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::use_cases::orders::OrderError;
use crate::domain::orders::invoice::RefundRequest;

pub struct ShopRefunds<'a, R, S>
where
    R: OrderRepository + ?Sized,
    S: ShopRepository + ?Sized,
{
    pub repo: &'a R,
    pub shops: &'a S,
}

impl<'a, R, S> ShopRefunds<'a, R, S>
where
    R: OrderRepository + ?Sized,
    S: ShopRepository + ?Sized,
{
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<RefundRequest>, OrderError> {
        let shop = self
            .shops
            .get_by_owner(user_id)
            .await?
            .ok_or(OrderError::ShopRequired)?;
        Ok(self.repo.list_refunds_for_shop(shop.id).await?)
    }

    /// Resolves a refund id to its shop order, checking the caller owns it.
    pub async fn shop_order_of(&self, user_id: Uuid, refund_id: Uuid) -> Result<Uuid, OrderError> {
        let shop = self
            .shops
            .get_by_owner(user_id)
            .await?
            .ok_or(OrderError::ShopRequired)?;
        let refund = self
            .repo
            .get_refund(refund_id)
            .await?
            .ok_or(OrderError::RefundNotFound)?;
        let owned = self
            .repo
            .get_shop_order(refund.shop_order_id)
            .await?
            .is_some_and(|d| d.order.shop_id == shop.id);
        if !owned {
            return Err(OrderError::RefundNotFound);
        }
        Ok(refund.shop_order_id)
    }
}
