use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::orders::invoice::{
    Invoice, InvoiceDetail, NewInvoice, RefundRequest, RefundStatus, ShopOrder, ShopOrderDetail,
};
use crate::domain::orders::status::OrderStatus;
use crate::domain::pagination::PageRequest;
use crate::domain::products::product::Review;

#[derive(thiserror::Error, Debug)]
pub enum CreateInvoiceError {
    #[error("stock exhausted for sku {0}")]
    StockExhausted(Uuid),
    #[error("voucher quota exhausted")]
    VoucherExhausted,
    #[error("cart item {0} no longer available")]
    CartItemGone(Uuid),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub enum RefundChange {
    Open { user_id: Uuid, reason: String },
    Resolve(RefundStatus),
}

/// A guarded status change plus its money/stock side effects, applied in one
/// transaction only if the shop order is still in `from`.
#[derive(Debug, Clone)]
pub struct Transition {
    pub shop_order_id: Uuid,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub note: Option<String>,
    pub refund_buyer: Option<Decimal>,
    pub pay_seller: Option<Decimal>,
    pub restock: bool,
    pub count_sold: bool,
    pub refund: Option<RefundChange>,
}

impl Transition {
    pub fn new(shop_order_id: Uuid, from: OrderStatus, to: OrderStatus) -> Self {
        Self {
            shop_order_id,
            from,
            to,
            note: None,
            refund_buyer: None,
            pay_seller: None,
            restock: false,
            count_sold: false,
            refund: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewTarget {
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub buyer_id: Uuid,
    pub status: OrderStatus,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, CreateInvoiceError>;
    async fn get_invoice(&self, user_id: Uuid, invoice_id: Uuid)
    -> anyhow::Result<Option<InvoiceDetail>>;
    async fn list_for_buyer(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ShopOrder>, i64)>;
    async fn list_for_shop(
        &self,
        shop_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ShopOrder>, i64)>;
    async fn get_shop_order(&self, id: Uuid) -> anyhow::Result<Option<ShopOrderDetail>>;
    // Returns false when the order left `from` concurrently
    async fn transition(&self, transition: &Transition) -> anyhow::Result<bool>;
    async fn find_review_target(&self, transaction_id: Uuid) -> anyhow::Result<Option<ReviewTarget>>;
    // None when the transaction was already reviewed
    async fn create_review(
        &self,
        target: &ReviewTarget,
        rating: i16,
        comment: Option<&str>,
    ) -> anyhow::Result<Option<Review>>;
    async fn list_refunds_for_shop(&self, shop_id: Uuid) -> anyhow::Result<Vec<RefundRequest>>;
    async fn get_refund(&self, id: Uuid) -> anyhow::Result<Option<RefundRequest>>;
}
