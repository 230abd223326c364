use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::orders::status::OrderStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    WaitingPayment,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::WaitingPayment => "waiting_payment",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => InvoiceStatus::Paid,
            "cancelled" => InvoiceStatus::Cancelled,
            _ => InvoiceStatus::WaitingPayment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Invoice {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_snapshot: String,
    pub marketplace_voucher_id: Option<Uuid>,
    pub total_goods: Decimal,
    pub shop_discount: Decimal,
    pub marketplace_discount: Decimal,
    pub total_shipping: Decimal,
    pub total_payment: Decimal,
    pub status: InvoiceStatus,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct ShopOrder {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub shop_id: Uuid,
    pub shop_name: String,
    pub buyer_id: Uuid,
    pub shop_voucher_id: Option<Uuid>,
    pub courier_id: i32,
    pub subtotal: Decimal,
    pub shop_discount: Decimal,
    pub marketplace_discount: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct TransactionLine {
    pub id: Uuid,
    pub shop_order_id: Uuid,
    pub sku_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub sku_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discounted_unit_price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct ShopOrderDetail {
    pub order: ShopOrder,
    pub lines: Vec<TransactionLine>,
    pub history: Vec<StatusEntry>,
}

#[derive(Debug, Clone)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub shops: Vec<ShopOrderDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Pending => "pending",
            RefundStatus::Accepted => "accepted",
            RefundStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "accepted" => RefundStatus::Accepted,
            "rejected" => RefundStatus::Rejected,
            _ => RefundStatus::Pending,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefundRequest {
    pub id: Uuid,
    pub shop_order_id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub status: RefundStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// --- Checkout output, persisted as one aggregate ---

#[derive(Debug, Clone)]
pub struct NewTransactionLine {
    pub cart_item_id: Uuid,
    pub sku_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub sku_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discounted_unit_price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewShopOrder {
    pub shop_id: Uuid,
    pub shop_name: String,
    pub shop_voucher_id: Option<Uuid>,
    pub courier_id: i32,
    pub subtotal: Decimal,
    pub shop_discount: Decimal,
    pub marketplace_discount: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub lines: Vec<NewTransactionLine>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub user_id: Uuid,
    pub address_snapshot: String,
    pub marketplace_voucher_id: Option<Uuid>,
    pub total_goods: Decimal,
    pub shop_discount: Decimal,
    pub marketplace_discount: Decimal,
    pub total_shipping: Decimal,
    pub total_payment: Decimal,
    pub shops: Vec<NewShopOrder>,
}
