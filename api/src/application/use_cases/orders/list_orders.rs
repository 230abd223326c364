use uuid::Uuid;

use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::use_cases::orders::OrderError;
use crate::domain::orders::invoice::{InvoiceDetail, ShopOrder, ShopOrderDetail};
use crate::domain::orders::status::OrderStatus;
use crate::domain::pagination::{Page, PageRequest};

pub struct BuyerOrders<'a, R: OrderRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: OrderRepository + ?Sized> BuyerOrders<'a, R> {
    pub async fn list(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<ShopOrder>, OrderError> {
        let (items, total) = self.repo.list_for_buyer(user_id, status, page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn invoice(&self, user_id: Uuid, invoice_id: Uuid) -> Result<InvoiceDetail, OrderError> {
        self.repo
            .get_invoice(user_id, invoice_id)
            .await?
            .ok_or(OrderError::NotFound)
    }

    pub async fn shop_order(&self, user_id: Uuid, id: Uuid) -> Result<ShopOrderDetail, OrderError> {
        self.repo
            .get_shop_order(id)
            .await?
            .filter(|d| d.order.buyer_id == user_id)
            .ok_or(OrderError::NotFound)
    }
}

pub struct SellerOrders<'a, R, S>
where
    R: OrderRepository + ?Sized,
    S: ShopRepository + ?Sized,
{
    pub repo: &'a R,
    pub shops: &'a S,
}

impl<'a, R, S> SellerOrders<'a, R, S>
where
    R: OrderRepository + ?Sized,
    S: ShopRepository + ?Sized,
{
    pub async fn shop_id(&self, user_id: Uuid) -> Result<Uuid, OrderError> {
        self.shops
            .get_by_owner(user_id)
            .await?
            .map(|s| s.id)
            .ok_or(OrderError::ShopRequired)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<ShopOrder>, OrderError> {
        let shop_id = self.shop_id(user_id).await?;
        let (items, total) = self.repo.list_for_shop(shop_id, status, page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<ShopOrderDetail, OrderError> {
        let shop_id = self.shop_id(user_id).await?;
        self.repo
            .get_shop_order(id)
            .await?
            .filter(|d| d.order.shop_id == shop_id)
            .ok_or(OrderError::NotFound)
    }
}
