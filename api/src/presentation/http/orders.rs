use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::use_cases::orders::checkout::{
    Checkout, CheckoutItem, CheckoutRequest as CheckoutDto, CheckoutShop,
};
use crate::application::use_cases::orders::lifecycle::{Actor, ApplyOrderAction};
use crate::application::use_cases::orders::list_orders::{BuyerOrders, SellerOrders};
use crate::application::use_cases::orders::refunds::ShopRefunds;
use crate::application::use_cases::orders::review::ReviewTransaction;
use crate::application::use_cases::wallets::pay_invoice::PayInvoice;
use crate::bootstrap::app_context::AppContext;
use crate::domain::orders::invoice::{
    Invoice, InvoiceDetail, NewInvoice, NewShopOrder, RefundRequest, ShopOrder, ShopOrderDetail,
    StatusEntry, TransactionLine,
};
use crate::domain::orders::status::{OrderAction, OrderStatus};
use crate::presentation::http::auth::AuthUser;
use crate::presentation::http::error::{ApiError, ApiJson};
use crate::presentation::http::products::ReviewResponse;
use crate::presentation::http::response::{
    ApiResult, Created, PageQuery, Paged, created, ok, with_message,
};

// --- Requests ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutItemRequest {
    pub cart_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutShopRequest {
    pub shop_id: Uuid,
    pub courier_id: i32,
    pub voucher_code: Option<String>,
    pub items: Vec<CheckoutItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub address_id: Uuid,
    pub shops: Vec<CheckoutShopRequest>,
    pub marketplace_voucher_code: Option<String>,
    /// Total shown to the buyer; ignored by the preview
    #[serde(default)]
    pub total: Decimal,
}

impl From<CheckoutRequest> for CheckoutDto {
    fn from(r: CheckoutRequest) -> Self {
        Self {
            address_id: r.address_id,
            shops: r
                .shops
                .into_iter()
                .map(|s| CheckoutShop {
                    shop_id: s.shop_id,
                    courier_id: s.courier_id,
                    voucher_code: s.voucher_code,
                    items: s
                        .items
                        .into_iter()
                        .map(|i| CheckoutItem {
                            cart_item_id: i.cart_item_id,
                            quantity: i.quantity,
                        })
                        .collect(),
                })
                .collect(),
            marketplace_voucher_code: r.marketplace_voucher_code,
            total: r.total,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderActionRequest {
    /// Stored on the status history; required as the reason of a refund request
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PayInvoiceRequest {
    pub pin: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    /// 1 to 5
    pub rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    /// Shop order status, e.g. `waiting_seller`
    pub status: Option<String>,
}

impl OrderFilter {
    fn status(&self) -> Result<Option<OrderStatus>, ApiError> {
        match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => OrderStatus::parse(raw)
                .map(Some)
                .ok_or_else(|| ApiError::invalid_input(format!("unknown status {raw}"))),
        }
    }
}

// --- Responses ---

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub address_snapshot: String,
    pub marketplace_voucher_id: Option<Uuid>,
    pub total_goods: Decimal,
    pub shop_discount: Decimal,
    pub marketplace_discount: Decimal,
    pub total_shipping: Decimal,
    pub total_payment: Decimal,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(i: Invoice) -> Self {
        Self {
            id: i.id,
            address_snapshot: i.address_snapshot,
            marketplace_voucher_id: i.marketplace_voucher_id,
            total_goods: i.total_goods,
            shop_discount: i.shop_discount,
            marketplace_discount: i.marketplace_discount,
            total_shipping: i.total_shipping,
            total_payment: i.total_payment,
            status: i.status.as_str().to_string(),
            paid_at: i.paid_at,
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopOrderResponse {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub shop_id: Uuid,
    pub shop_name: String,
    pub courier_id: i32,
    pub subtotal: Decimal,
    pub shop_discount: Decimal,
    pub marketplace_discount: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShopOrder> for ShopOrderResponse {
    fn from(o: ShopOrder) -> Self {
        Self {
            id: o.id,
            invoice_id: o.invoice_id,
            shop_id: o.shop_id,
            shop_name: o.shop_name,
            courier_id: o.courier_id,
            subtotal: o.subtotal,
            shop_discount: o.shop_discount,
            marketplace_discount: o.marketplace_discount,
            shipping_cost: o.shipping_cost,
            total: o.total,
            status: o.status.as_str().to_string(),
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub sku_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub sku_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discounted_unit_price: Decimal,
    pub total: Decimal,
}

impl From<TransactionLine> for TransactionResponse {
    fn from(t: TransactionLine) -> Self {
        Self {
            id: t.id,
            sku_id: t.sku_id,
            product_id: t.product_id,
            product_name: t.product_name,
            sku_name: t.sku_name,
            quantity: t.quantity,
            unit_price: t.unit_price,
            discounted_unit_price: t.discounted_unit_price,
            total: t.total,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusEntryResponse {
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StatusEntry> for StatusEntryResponse {
    fn from(s: StatusEntry) -> Self {
        Self {
            status: s.status.as_str().to_string(),
            note: s.note,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopOrderDetailResponse {
    pub order: ShopOrderResponse,
    pub items: Vec<TransactionResponse>,
    pub history: Vec<StatusEntryResponse>,
}

impl From<ShopOrderDetail> for ShopOrderDetailResponse {
    fn from(d: ShopOrderDetail) -> Self {
        Self {
            order: d.order.into(),
            items: d.lines.into_iter().map(Into::into).collect(),
            history: d.history.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceDetailResponse {
    pub invoice: InvoiceResponse,
    pub shops: Vec<ShopOrderDetailResponse>,
}

impl From<InvoiceDetail> for InvoiceDetailResponse {
    fn from(d: InvoiceDetail) -> Self {
        Self {
            invoice: d.invoice.into(),
            shops: d.shops.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewLineResponse {
    pub sku_id: Uuid,
    pub product_name: String,
    pub sku_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discounted_unit_price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewShopResponse {
    pub shop_id: Uuid,
    pub shop_name: String,
    pub courier_id: i32,
    pub subtotal: Decimal,
    pub shop_discount: Decimal,
    pub marketplace_discount: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub items: Vec<PreviewLineResponse>,
}

impl From<NewShopOrder> for PreviewShopResponse {
    fn from(o: NewShopOrder) -> Self {
        Self {
            shop_id: o.shop_id,
            shop_name: o.shop_name,
            courier_id: o.courier_id,
            subtotal: o.subtotal,
            shop_discount: o.shop_discount,
            marketplace_discount: o.marketplace_discount,
            shipping_cost: o.shipping_cost,
            total: o.total,
            items: o
                .lines
                .into_iter()
                .map(|l| PreviewLineResponse {
                    sku_id: l.sku_id,
                    product_name: l.product_name,
                    sku_name: l.sku_name,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    discounted_unit_price: l.discounted_unit_price,
                    total: l.total,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutPreviewResponse {
    pub total_goods: Decimal,
    pub shop_discount: Decimal,
    pub marketplace_discount: Decimal,
    pub total_shipping: Decimal,
    /// The value to send back as `total` when checking out
    pub total_payment: Decimal,
    pub shops: Vec<PreviewShopResponse>,
}

impl From<NewInvoice> for CheckoutPreviewResponse {
    fn from(i: NewInvoice) -> Self {
        Self {
            total_goods: i.total_goods,
            shop_discount: i.shop_discount,
            marketplace_discount: i.marketplace_discount,
            total_shipping: i.total_shipping,
            total_payment: i.total_payment,
            shops: i.shops.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefundResponse {
    pub id: Uuid,
    pub shop_order_id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<RefundRequest> for RefundResponse {
    fn from(r: RefundRequest) -> Self {
        Self {
            id: r.id,
            shop_order_id: r.shop_order_id,
            user_id: r.user_id,
            reason: r.reason,
            status: r.status.as_str().to_string(),
            created_at: r.created_at,
        }
    }
}

// --- Action names accepted in paths ---

fn buyer_action(name: &str) -> Option<OrderAction> {
    match name {
        "cancel" => Some(OrderAction::Cancel),
        "receive" => Some(OrderAction::Receive),
        "complete" => Some(OrderAction::Complete),
        "refund" => Some(OrderAction::RequestRefund),
        _ => None,
    }
}

fn seller_action(name: &str) -> Option<OrderAction> {
    match name {
        "accept" => Some(OrderAction::Accept),
        "ship" => Some(OrderAction::Ship),
        "reject" => Some(OrderAction::Reject),
        _ => None,
    }
}

fn refund_decision(name: &str) -> Option<OrderAction> {
    match name {
        "accept" => Some(OrderAction::AcceptRefund),
        "reject" => Some(OrderAction::RejectRefund),
        _ => None,
    }
}

fn unknown_action(name: &str) -> ApiError {
    ApiError::not_found("UNKNOWN_ACTION", format!("unknown action {name}"))
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/checkout", post(checkout))
        .route("/orders/checkout/preview", post(preview_checkout))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/:action", post(buyer_order_action))
        .route("/invoices/:id", get(get_invoice))
        .route("/invoices/:id/pay", post(pay_invoice))
        .route("/transactions/:id/review", post(review_transaction))
        .route("/shops/me/orders", get(list_shop_orders))
        .route("/shops/me/orders/:id", get(get_shop_order))
        .route("/shops/me/orders/:id/:action", post(seller_order_action))
        .route("/shops/me/refunds", get(list_refunds))
        .route("/shops/me/refunds/:id/:decision", post(decide_refund))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/v1/orders/checkout", tag = "Orders", request_body = CheckoutRequest,
    responses((status = 201, body = InvoiceResponse), (status = 400, description = "Validation failed")))]
pub async fn checkout(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> Created<InvoiceResponse> {
    let addresses = ctx.address_repo();
    let shops = ctx.shop_repo();
    let carts = ctx.cart_repo();
    let products = ctx.product_repo();
    let vouchers = ctx.voucher_repo();
    let orders = ctx.order_repo();
    let uc = Checkout {
        addresses: addresses.as_ref(),
        shops: shops.as_ref(),
        carts: carts.as_ref(),
        products: products.as_ref(),
        vouchers: vouchers.as_ref(),
        orders: orders.as_ref(),
    };
    let invoice = uc.execute(user.id, &req.into()).await?;
    Ok(created(invoice.into()))
}

#[utoipa::path(post, path = "/v1/orders/checkout/preview", tag = "Orders", request_body = CheckoutRequest,
    responses((status = 200, body = CheckoutPreviewResponse)))]
pub async fn preview_checkout(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> ApiResult<CheckoutPreviewResponse> {
    let addresses = ctx.address_repo();
    let shops = ctx.shop_repo();
    let carts = ctx.cart_repo();
    let products = ctx.product_repo();
    let vouchers = ctx.voucher_repo();
    let orders = ctx.order_repo();
    let uc = Checkout {
        addresses: addresses.as_ref(),
        shops: shops.as_ref(),
        carts: carts.as_ref(),
        products: products.as_ref(),
        vouchers: vouchers.as_ref(),
        orders: orders.as_ref(),
    };
    let preview = uc.preview(user.id, &req.into()).await?;
    Ok(ok(preview.into()))
}

#[utoipa::path(get, path = "/v1/orders", tag = "Orders", params(OrderFilter, PageQuery),
    responses((status = 200, body = [ShopOrderResponse])))]
pub async fn list_orders(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Query(filter): Query<OrderFilter>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Paged<ShopOrderResponse>> {
    let repo = ctx.order_repo();
    let uc = BuyerOrders {
        repo: repo.as_ref(),
    };
    let page = uc.list(user.id, filter.status()?, page.request()).await?;
    Ok(ok(Paged::from_page(page)))
}

#[utoipa::path(get, path = "/v1/orders/{id}", tag = "Orders",
    params(("id" = Uuid, Path, description = "Shop order ID")),
    responses((status = 200, body = ShopOrderDetailResponse)))]
pub async fn get_order(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ShopOrderDetailResponse> {
    let repo = ctx.order_repo();
    let uc = BuyerOrders {
        repo: repo.as_ref(),
    };
    Ok(ok(uc.shop_order(user.id, id).await?.into()))
}

#[utoipa::path(post, path = "/v1/orders/{id}/{action}", tag = "Orders", request_body = OrderActionRequest,
    params(
        ("id" = Uuid, Path, description = "Shop order ID"),
        ("action" = String, Path, description = "cancel | receive | complete | refund")
    ),
    responses((status = 200, body = ShopOrderResponse)))]
pub async fn buyer_order_action(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path((id, action)): Path<(Uuid, String)>,
    ApiJson(req): ApiJson<OrderActionRequest>,
) -> ApiResult<ShopOrderResponse> {
    let action_kind = buyer_action(&action).ok_or_else(|| unknown_action(&action))?;
    let repo = ctx.order_repo();
    let uc = ApplyOrderAction {
        repo: repo.as_ref(),
    };
    let order = uc
        .execute(Actor::Buyer(user.id), id, action_kind, req.note)
        .await?;
    Ok(with_message("order updated", order.into()))
}

#[utoipa::path(get, path = "/v1/invoices/{id}", tag = "Orders",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses((status = 200, body = InvoiceDetailResponse)))]
pub async fn get_invoice(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<InvoiceDetailResponse> {
    let repo = ctx.order_repo();
    let uc = BuyerOrders {
        repo: repo.as_ref(),
    };
    Ok(ok(uc.invoice(user.id, id).await?.into()))
}

#[utoipa::path(post, path = "/v1/invoices/{id}/pay", tag = "Orders", request_body = PayInvoiceRequest,
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses((status = 200, body = PaymentResponse), (status = 423, description = "Wallet locked")))]
pub async fn pay_invoice(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<PayInvoiceRequest>,
) -> ApiResult<PaymentResponse> {
    let wallets = ctx.wallet_repo();
    let orders = ctx.order_repo();
    let cache = ctx.cache();
    let uc = PayInvoice {
        wallets: wallets.as_ref(),
        orders: orders.as_ref(),
        cache: cache.as_ref(),
    };
    let paid = uc.execute(user.id, id, &req.pin).await?;
    Ok(with_message(
        "payment success",
        PaymentResponse {
            invoice_id: id,
            amount: paid.amount,
            balance: paid.wallet.balance,
        },
    ))
}

#[utoipa::path(post, path = "/v1/transactions/{id}/review", tag = "Orders", request_body = ReviewRequest,
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses((status = 201, body = ReviewResponse)))]
pub async fn review_transaction(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> Created<ReviewResponse> {
    let repo = ctx.order_repo();
    let uc = ReviewTransaction {
        repo: repo.as_ref(),
    };
    let review = uc.execute(user.id, id, req.rating, req.comment).await?;
    Ok(created(review.into()))
}

#[utoipa::path(get, path = "/v1/shops/me/orders", tag = "Seller orders", params(OrderFilter, PageQuery),
    responses((status = 200, body = [ShopOrderResponse])))]
pub async fn list_shop_orders(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Query(filter): Query<OrderFilter>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Paged<ShopOrderResponse>> {
    let repo = ctx.order_repo();
    let shops = ctx.shop_repo();
    let uc = SellerOrders {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    let page = uc.list(user.id, filter.status()?, page.request()).await?;
    Ok(ok(Paged::from_page(page)))
}

#[utoipa::path(get, path = "/v1/shops/me/orders/{id}", tag = "Seller orders",
    params(("id" = Uuid, Path, description = "Shop order ID")),
    responses((status = 200, body = ShopOrderDetailResponse)))]
pub async fn get_shop_order(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ShopOrderDetailResponse> {
    let repo = ctx.order_repo();
    let shops = ctx.shop_repo();
    let uc = SellerOrders {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    Ok(ok(uc.get(user.id, id).await?.into()))
}

#[utoipa::path(post, path = "/v1/shops/me/orders/{id}/{action}", tag = "Seller orders", request_body = OrderActionRequest,
    params(
        ("id" = Uuid, Path, description = "Shop order ID"),
        ("action" = String, Path, description = "accept | ship | reject")
    ),
    responses((status = 200, body = ShopOrderResponse)))]
pub async fn seller_order_action(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path((id, action)): Path<(Uuid, String)>,
    ApiJson(req): ApiJson<OrderActionRequest>,
) -> ApiResult<ShopOrderResponse> {
    let action_kind = seller_action(&action).ok_or_else(|| unknown_action(&action))?;
    let repo = ctx.order_repo();
    let shops = ctx.shop_repo();
    let seller = SellerOrders {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    let shop_id = seller.shop_id(user.id).await?;
    let uc = ApplyOrderAction {
        repo: repo.as_ref(),
    };
    let order = uc
        .execute(Actor::Seller(shop_id), id, action_kind, req.note)
        .await?;
    Ok(with_message("order updated", order.into()))
}

#[utoipa::path(get, path = "/v1/shops/me/refunds", tag = "Seller orders",
    responses((status = 200, body = [RefundResponse])))]
pub async fn list_refunds(
    State(ctx): State<AppContext>,
    user: AuthUser,
) -> ApiResult<Vec<RefundResponse>> {
    let repo = ctx.order_repo();
    let shops = ctx.shop_repo();
    let uc = ShopRefunds {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    let items = uc.list(user.id).await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/v1/shops/me/refunds/{id}/{decision}", tag = "Seller orders", request_body = OrderActionRequest,
    params(
        ("id" = Uuid, Path, description = "Refund request ID"),
        ("decision" = String, Path, description = "accept | reject")
    ),
    responses((status = 200, body = ShopOrderResponse)))]
pub async fn decide_refund(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path((id, decision)): Path<(Uuid, String)>,
    ApiJson(req): ApiJson<OrderActionRequest>,
) -> ApiResult<ShopOrderResponse> {
    let action_kind = refund_decision(&decision).ok_or_else(|| unknown_action(&decision))?;
    let repo = ctx.order_repo();
    let shops = ctx.shop_repo();
    let refunds = ShopRefunds {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    let shop_order_id = refunds.shop_order_of(user.id, id).await?;
    let shop_id = SellerOrders {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    }
    .shop_id(user.id)
    .await?;
    let uc = ApplyOrderAction {
        repo: repo.as_ref(),
    };
    let order = uc
        .execute(Actor::Seller(shop_id), shop_order_id, action_kind, req.note)
        .await?;
    Ok(with_message("refund resolved", order.into()))
}
