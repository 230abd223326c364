use axum::{
    Router,
    extract::{Path, State},
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::ports::cart_repository::CartLine;
use crate::application::use_cases::carts::{Cart, CartShopGroup};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::AuthUser;
use crate::presentation::http::error::ApiJson;
use crate::presentation::http::response::{ApiResult, Created, created, ok, with_message};

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub quantity: i32,
    pub sku_id: Uuid,
    pub sku_name: String,
    pub price: Decimal,
    pub stock: i32,
    pub weight_grams: i32,
    pub bulk_price: Option<Decimal>,
    pub bulk_min_quantity: Option<i32>,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_slug: String,
}

impl From<CartLine> for CartLineResponse {
    fn from(l: CartLine) -> Self {
        Self {
            id: l.cart_item_id,
            quantity: l.quantity,
            sku_id: l.sku_id,
            sku_name: l.sku_name,
            price: l.price,
            stock: l.stock,
            weight_grams: l.weight_grams,
            bulk_price: l.bulk_price,
            bulk_min_quantity: l.bulk_min_quantity,
            product_id: l.product_id,
            product_name: l.product_name,
            product_slug: l.product_slug,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartShopResponse {
    pub shop_id: Uuid,
    pub shop_name: String,
    /// At list prices, before promotions and vouchers
    pub subtotal: Decimal,
    pub items: Vec<CartLineResponse>,
}

impl From<CartShopGroup> for CartShopResponse {
    fn from(g: CartShopGroup) -> Self {
        Self {
            subtotal: g.subtotal(),
            shop_id: g.shop_id,
            shop_name: g.shop_name,
            items: g.lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub sku_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    pub quantity: i32,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/carts", get(list_cart).post(add_to_cart))
        .route("/carts/:id", put(update_cart_item).delete(delete_cart_item))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/v1/carts", tag = "Carts", responses((status = 200, body = [CartShopResponse])))]
pub async fn list_cart(State(ctx): State<AppContext>, user: AuthUser) -> ApiResult<Vec<CartShopResponse>> {
    let carts = ctx.cart_repo();
    let products = ctx.product_repo();
    let shops = ctx.shop_repo();
    let uc = Cart {
        carts: carts.as_ref(),
        products: products.as_ref(),
        shops: shops.as_ref(),
    };
    let groups = uc.list(user.id).await?;
    Ok(ok(groups.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/v1/carts", tag = "Carts", request_body = AddToCartRequest,
    responses((status = 201, body = CartLineResponse)))]
pub async fn add_to_cart(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<AddToCartRequest>,
) -> Created<CartLineResponse> {
    let carts = ctx.cart_repo();
    let products = ctx.product_repo();
    let shops = ctx.shop_repo();
    let uc = Cart {
        carts: carts.as_ref(),
        products: products.as_ref(),
        shops: shops.as_ref(),
    };
    let line = uc.add(user.id, req.sku_id, req.quantity).await?;
    Ok(created(line.into()))
}

#[utoipa::path(put, path = "/v1/carts/{id}", tag = "Carts", request_body = UpdateCartRequest,
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses((status = 200)))]
pub async fn update_cart_item(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateCartRequest>,
) -> ApiResult<()> {
    let carts = ctx.cart_repo();
    let products = ctx.product_repo();
    let shops = ctx.shop_repo();
    let uc = Cart {
        carts: carts.as_ref(),
        products: products.as_ref(),
        shops: shops.as_ref(),
    };
    uc.update(user.id, id, req.quantity).await?;
    Ok(with_message("cart updated", ()))
}

#[utoipa::path(delete, path = "/v1/carts/{id}", tag = "Carts",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses((status = 200)))]
pub async fn delete_cart_item(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let carts = ctx.cart_repo();
    let products = ctx.product_repo();
    let shops = ctx.shop_repo();
    let uc = Cart {
        carts: carts.as_ref(),
        products: products.as_ref(),
        shops: shops.as_ref(),
    };
    uc.delete(user.id, id).await?;
    Ok(with_message("cart item removed", ()))
}
