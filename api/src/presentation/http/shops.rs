use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get, patch, post, put},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::products::create_product::{
    CreateProduct, CreateProductRequest as CreateProductDto,
};
use crate::application::use_cases::products::update_product::UpdateProduct;
use crate::application::use_cases::shops::couriers::SetShopCouriers;
use crate::application::use_cases::shops::create_shop::{
    CreateShop, CreateShopRequest as CreateShopDto,
};
use crate::application::use_cases::shops::get_shop::{GetShop, ShopProfile};
use crate::application::use_cases::shops::promotions::{CreatePromotion, ListPromotions};
use crate::application::use_cases::shops::update_shop::UpdateShop;
use crate::application::use_cases::shops::vouchers::{CreateShopVoucher, ManageShopVouchers};
use crate::bootstrap::app_context::AppContext;
use crate::domain::pricing::DiscountType;
use crate::domain::products::product::{NewPromotion, NewSku, ProductUpdate, SkuUpdate};
use crate::domain::shops::shop::Shop;
use crate::domain::shops::voucher::{NewVoucher, ShopVoucher};
use crate::presentation::http::auth::AuthUser;
use crate::presentation::http::error::{ApiError, ApiJson};
use crate::presentation::http::locations::CourierResponse;
use crate::presentation::http::products::{
    ProductDetailResponse, ProductResponse, PromotionResponse, SkuResponse,
};
use crate::presentation::http::response::{ApiResult, Created, created, ok, with_message};

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub address_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Shop> for ShopResponse {
    fn from(s: Shop) -> Self {
        Self {
            id: s.id,
            name: s.name,
            slug: s.slug,
            description: s.description,
            address_id: s.address_id,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopProfileResponse {
    pub shop: ShopResponse,
    pub couriers: Vec<CourierResponse>,
}

impl From<ShopProfile> for ShopProfileResponse {
    fn from(p: ShopProfile) -> Self {
        Self {
            shop: p.shop.into(),
            couriers: p.couriers.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShopRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub address_id: Uuid,
    pub courier_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShopRequest {
    pub description: Option<String>,
    pub address_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetCouriersRequest {
    pub courier_ids: Vec<i32>,
}

/// Voucher definition shared by shop and marketplace vouchers.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VoucherRequest {
    pub code: String,
    pub name: String,
    /// `percent`, `nominal` or (marketplace only) `shipping`
    pub discount_type: String,
    pub amount: Decimal,
    pub max_discount: Option<Decimal>,
    /// Marketplace only
    pub category_id: Option<i32>,
    #[serde(default)]
    pub min_spending: Decimal,
    pub quota: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl VoucherRequest {
    pub(crate) fn into_new(self) -> Result<NewVoucher, ApiError> {
        Ok(NewVoucher {
            discount_type: parse_discount_type(&self.discount_type)?,
            code: self.code,
            name: self.name,
            amount: self.amount,
            max_discount: self.max_discount,
            category_id: self.category_id,
            min_spending: self.min_spending,
            quota: self.quota,
            start_at: self.start_at,
            end_at: self.end_at,
        })
    }
}

pub(crate) fn parse_discount_type(raw: &str) -> Result<DiscountType, ApiError> {
    DiscountType::parse(raw.trim())
        .ok_or_else(|| ApiError::invalid_input(format!("unknown discount_type {raw}")))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopVoucherResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub discount_type: String,
    pub amount: Decimal,
    pub min_spending: Decimal,
    pub quota: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl From<ShopVoucher> for ShopVoucherResponse {
    fn from(v: ShopVoucher) -> Self {
        Self {
            id: v.id,
            code: v.code,
            name: v.name,
            discount_type: v.discount_type.as_str().to_string(),
            amount: v.amount,
            min_spending: v.min_spending,
            quota: v.quota,
            start_at: v.start_at,
            end_at: v.end_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PromotionRequest {
    pub product_id: Uuid,
    pub name: String,
    /// `percent` or `nominal`
    pub discount_type: String,
    pub amount: Decimal,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SkuRequest {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub weight_grams: i32,
    pub bulk_price: Option<Decimal>,
    pub bulk_min_quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub category_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub skus: Vec<SkuRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSkuRequest {
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/shops", post(create_shop))
        .route("/shops/me", get(my_shop).put(update_shop))
        .route("/shops/me/couriers", put(set_couriers))
        .route(
            "/shops/me/vouchers",
            get(list_shop_vouchers).post(create_shop_voucher),
        )
        .route("/shops/me/vouchers/:id", delete(delete_shop_voucher))
        .route(
            "/shops/me/promotions",
            get(list_promotions).post(create_promotion),
        )
        .route("/shops/me/products", post(create_product))
        .route("/shops/me/products/:id", patch(update_product))
        .route("/shops/me/skus/:id", patch(update_sku))
        .route("/shops/:slug", get(get_shop))
        .route("/shops/:slug/vouchers", get(active_shop_vouchers))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/v1/shops", tag = "Shops", request_body = CreateShopRequest,
    responses((status = 201, body = ShopResponse)))]
pub async fn create_shop(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateShopRequest>,
) -> Created<ShopResponse> {
    let shops = ctx.shop_repo();
    let addresses = ctx.address_repo();
    let uc = CreateShop {
        shops: shops.as_ref(),
        addresses: addresses.as_ref(),
    };
    let dto = CreateShopDto {
        name: req.name,
        description: req.description,
        address_id: req.address_id,
        courier_ids: req.courier_ids,
    };
    let shop = uc.execute(user.id, dto).await?;
    Ok(created(shop.into()))
}

#[utoipa::path(get, path = "/v1/shops/me", tag = "Shops", responses((status = 200, body = ShopProfileResponse)))]
pub async fn my_shop(State(ctx): State<AppContext>, user: AuthUser) -> ApiResult<ShopProfileResponse> {
    let shops = ctx.shop_repo();
    let uc = GetShop {
        shops: shops.as_ref(),
    };
    Ok(ok(uc.mine(user.id).await?.into()))
}

#[utoipa::path(put, path = "/v1/shops/me", tag = "Shops", request_body = UpdateShopRequest,
    responses((status = 200, body = ShopResponse)))]
pub async fn update_shop(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<UpdateShopRequest>,
) -> ApiResult<ShopResponse> {
    let shops = ctx.shop_repo();
    let addresses = ctx.address_repo();
    let uc = UpdateShop {
        shops: shops.as_ref(),
        addresses: addresses.as_ref(),
    };
    let shop = uc.execute(user.id, req.description, req.address_id).await?;
    Ok(with_message("shop updated", shop.into()))
}

#[utoipa::path(put, path = "/v1/shops/me/couriers", tag = "Shops", request_body = SetCouriersRequest,
    responses((status = 200, body = [CourierResponse])))]
pub async fn set_couriers(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<SetCouriersRequest>,
) -> ApiResult<Vec<CourierResponse>> {
    let shops = ctx.shop_repo();
    let uc = SetShopCouriers {
        shops: shops.as_ref(),
    };
    let couriers = uc.execute(user.id, req.courier_ids).await?;
    Ok(ok(couriers.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/v1/shops/{slug}", tag = "Shops", security(()),
    params(("slug" = String, Path, description = "Shop slug")),
    responses((status = 200, body = ShopProfileResponse)))]
pub async fn get_shop(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
) -> ApiResult<ShopProfileResponse> {
    let shops = ctx.shop_repo();
    let uc = GetShop {
        shops: shops.as_ref(),
    };
    Ok(ok(uc.by_slug(&slug).await?.into()))
}

#[utoipa::path(get, path = "/v1/shops/{slug}/vouchers", tag = "Shops", security(()),
    params(("slug" = String, Path, description = "Shop slug")),
    responses((status = 200, body = [ShopVoucherResponse])))]
pub async fn active_shop_vouchers(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
) -> ApiResult<Vec<ShopVoucherResponse>> {
    let shops = ctx.shop_repo();
    let vouchers = ctx.voucher_repo();
    let uc = ManageShopVouchers {
        shops: shops.as_ref(),
        vouchers: vouchers.as_ref(),
    };
    let items = uc.list_active(&slug).await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/v1/shops/me/vouchers", tag = "Shops", request_body = VoucherRequest,
    responses((status = 201, body = ShopVoucherResponse)))]
pub async fn create_shop_voucher(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<VoucherRequest>,
) -> Created<ShopVoucherResponse> {
    let shops = ctx.shop_repo();
    let vouchers = ctx.voucher_repo();
    let uc = CreateShopVoucher {
        shops: shops.as_ref(),
        vouchers: vouchers.as_ref(),
    };
    let voucher = uc.execute(user.id, req.into_new()?).await?;
    Ok(created(voucher.into()))
}

#[utoipa::path(get, path = "/v1/shops/me/vouchers", tag = "Shops",
    responses((status = 200, body = [ShopVoucherResponse])))]
pub async fn list_shop_vouchers(
    State(ctx): State<AppContext>,
    user: AuthUser,
) -> ApiResult<Vec<ShopVoucherResponse>> {
    let shops = ctx.shop_repo();
    let vouchers = ctx.voucher_repo();
    let uc = ManageShopVouchers {
        shops: shops.as_ref(),
        vouchers: vouchers.as_ref(),
    };
    let items = uc.list(user.id).await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(delete, path = "/v1/shops/me/vouchers/{id}", tag = "Shops",
    params(("id" = Uuid, Path, description = "Voucher ID")),
    responses((status = 200)))]
pub async fn delete_shop_voucher(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let shops = ctx.shop_repo();
    let vouchers = ctx.voucher_repo();
    let uc = ManageShopVouchers {
        shops: shops.as_ref(),
        vouchers: vouchers.as_ref(),
    };
    uc.delete(user.id, id).await?;
    Ok(with_message("voucher deleted", ()))
}

#[utoipa::path(post, path = "/v1/shops/me/promotions", tag = "Shops", request_body = PromotionRequest,
    responses((status = 201, body = PromotionResponse)))]
pub async fn create_promotion(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<PromotionRequest>,
) -> Created<PromotionResponse> {
    let shops = ctx.shop_repo();
    let products = ctx.product_repo();
    let cache = ctx.cache();
    let uc = CreatePromotion {
        shops: shops.as_ref(),
        products: products.as_ref(),
        cache: cache.as_ref(),
    };
    let input = NewPromotion {
        discount_type: parse_discount_type(&req.discount_type)?,
        product_id: req.product_id,
        name: req.name,
        amount: req.amount,
        start_at: req.start_at,
        end_at: req.end_at,
    };
    let promotion = uc.execute(user.id, input).await?;
    Ok(created(promotion.into()))
}

#[utoipa::path(get, path = "/v1/shops/me/promotions", tag = "Shops",
    responses((status = 200, body = [PromotionResponse])))]
pub async fn list_promotions(
    State(ctx): State<AppContext>,
    user: AuthUser,
) -> ApiResult<Vec<PromotionResponse>> {
    let shops = ctx.shop_repo();
    let products = ctx.product_repo();
    let uc = ListPromotions {
        shops: shops.as_ref(),
        products: products.as_ref(),
    };
    let items = uc.execute(user.id).await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/v1/shops/me/products", tag = "Shops", request_body = CreateProductRequest,
    responses((status = 201, body = ProductDetailResponse)))]
pub async fn create_product(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> Created<ProductDetailResponse> {
    let shops = ctx.shop_repo();
    let products = ctx.product_repo();
    let uc = CreateProduct {
        shops: shops.as_ref(),
        products: products.as_ref(),
    };
    let dto = CreateProductDto {
        category_id: req.category_id,
        name: req.name,
        description: req.description,
        skus: req
            .skus
            .into_iter()
            .map(|s| NewSku {
                name: s.name,
                price: s.price,
                stock: s.stock,
                weight_grams: s.weight_grams,
                bulk_price: s.bulk_price,
                bulk_min_quantity: s.bulk_min_quantity,
            })
            .collect(),
    };
    let detail = uc.execute(user.id, dto).await?;
    Ok(created(ProductDetailResponse {
        id: detail.product.id,
        shop_id: detail.product.shop_id,
        shop_name: detail.shop_name,
        shop_slug: detail.shop_slug,
        category_id: detail.product.category_id,
        category_name: detail.category_name,
        name: detail.product.name,
        slug: detail.product.slug,
        description: detail.product.description,
        sold_count: detail.product.sold_count,
        favorite_count: detail.product.favorite_count,
        rating: detail.rating,
        review_count: detail.review_count,
        skus: detail.skus.into_iter().map(SkuResponse::from).collect(),
        promotion: None,
        created_at: detail.product.created_at,
    }))
}

#[utoipa::path(patch, path = "/v1/shops/me/products/{id}", tag = "Shops", request_body = UpdateProductRequest,
    params(("id" = Uuid, Path, description = "Product ID")),
    responses((status = 200, body = ProductResponse)))]
pub async fn update_product(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateProductRequest>,
) -> ApiResult<ProductResponse> {
    let shops = ctx.shop_repo();
    let products = ctx.product_repo();
    let cache = ctx.cache();
    let uc = UpdateProduct {
        shops: shops.as_ref(),
        products: products.as_ref(),
        cache: cache.as_ref(),
    };
    let update = ProductUpdate {
        name: req.name,
        description: req.description,
        is_archived: req.is_archived,
    };
    let product = uc.product(user.id, id, update).await?;
    Ok(with_message("product updated", product.into()))
}

#[utoipa::path(patch, path = "/v1/shops/me/skus/{id}", tag = "Shops", request_body = UpdateSkuRequest,
    params(("id" = Uuid, Path, description = "SKU ID")),
    responses((status = 200, body = SkuResponse)))]
pub async fn update_sku(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateSkuRequest>,
) -> ApiResult<SkuResponse> {
    let shops = ctx.shop_repo();
    let products = ctx.product_repo();
    let cache = ctx.cache();
    let uc = UpdateProduct {
        shops: shops.as_ref(),
        products: products.as_ref(),
        cache: cache.as_ref(),
    };
    let update = SkuUpdate {
        price: req.price,
        stock: req.stock,
    };
    let sku = uc.sku(user.id, id, update).await?;
    Ok(with_message("sku updated", sku.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn voucher(discount_type: &str) -> VoucherRequest {
        VoucherRequest {
            code: "hemat10".into(),
            name: "Hemat".into(),
            discount_type: discount_type.into(),
            amount: dec!(10),
            max_discount: None,
            category_id: None,
            min_spending: dec!(0),
            quota: 5,
            start_at: Utc::now(),
            end_at: Utc::now() + chrono::Duration::days(1),
        }
    }

    #[test]
    fn voucher_request_maps_discount_type() {
        let v = voucher("percent").into_new().unwrap();
        assert_eq!(v.discount_type, DiscountType::Percent);
        assert_eq!(v.quota, 5);
    }

    #[test]
    fn unknown_discount_type_is_invalid_input() {
        let err = voucher("cashback").into_new().unwrap_err();
        assert_eq!(err.code, "INVALID_INPUT");
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
