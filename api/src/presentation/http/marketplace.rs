use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::marketplace::banners::{CreateBanner, ListBanners};
use crate::application::use_cases::marketplace::vouchers::{
    CreateMarketplaceVoucher, ListMarketplaceVouchers,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::marketplace::banner::{Banner, NewBanner};
use crate::domain::marketplace::voucher::MarketplaceVoucher;
use crate::presentation::http::auth::AdminUser;
use crate::presentation::http::error::ApiJson;
use crate::presentation::http::response::{ApiResult, Created, created, ok};
use crate::presentation::http::shops::VoucherRequest;

#[derive(Debug, Serialize, ToSchema)]
pub struct MarketplaceVoucherResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub category_id: Option<i32>,
    pub discount_type: String,
    pub amount: Decimal,
    pub max_discount: Option<Decimal>,
    pub min_spending: Decimal,
    pub quota: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl From<MarketplaceVoucher> for MarketplaceVoucherResponse {
    fn from(v: MarketplaceVoucher) -> Self {
        Self {
            id: v.id,
            code: v.code,
            name: v.name,
            category_id: v.category_id,
            discount_type: v.discount_type.as_str().to_string(),
            amount: v.amount,
            max_discount: v.max_discount,
            min_spending: v.min_spending,
            quota: v.quota,
            start_at: v.start_at,
            end_at: v.end_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BannerResponse {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl From<Banner> for BannerResponse {
    fn from(b: Banner) -> Self {
        Self {
            id: b.id,
            title: b.title,
            image_url: b.image_url,
            link_url: b.link_url,
            start_at: b.start_at,
            end_at: b.end_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BannerRequest {
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl From<BannerRequest> for NewBanner {
    fn from(r: BannerRequest) -> Self {
        Self {
            title: r.title,
            image_url: r.image_url,
            link_url: r.link_url,
            start_at: r.start_at,
            end_at: r.end_at,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/marketplace/vouchers",
            get(list_vouchers).post(create_voucher),
        )
        .route("/marketplace/banners", get(list_banners).post(create_banner))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/v1/marketplace/vouchers", tag = "Marketplace", security(()),
    responses((status = 200, body = [MarketplaceVoucherResponse])))]
pub async fn list_vouchers(
    State(ctx): State<AppContext>,
) -> ApiResult<Vec<MarketplaceVoucherResponse>> {
    let vouchers = ctx.voucher_repo();
    let uc = ListMarketplaceVouchers {
        vouchers: vouchers.as_ref(),
    };
    let items = uc.execute().await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/v1/marketplace/vouchers", tag = "Marketplace", request_body = VoucherRequest,
    responses((status = 201, body = MarketplaceVoucherResponse), (status = 403, description = "Admin only")))]
pub async fn create_voucher(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<VoucherRequest>,
) -> Created<MarketplaceVoucherResponse> {
    let vouchers = ctx.voucher_repo();
    let products = ctx.product_repo();
    let uc = CreateMarketplaceVoucher {
        vouchers: vouchers.as_ref(),
        products: products.as_ref(),
    };
    let voucher = uc.execute(req.into_new()?).await?;
    Ok(created(voucher.into()))
}

#[utoipa::path(get, path = "/v1/marketplace/banners", tag = "Marketplace", security(()),
    responses((status = 200, body = [BannerResponse])))]
pub async fn list_banners(State(ctx): State<AppContext>) -> ApiResult<Vec<BannerResponse>> {
    let banners = ctx.banner_repo();
    let uc = ListBanners {
        banners: banners.as_ref(),
    };
    let items = uc.execute().await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/v1/marketplace/banners", tag = "Marketplace", request_body = BannerRequest,
    responses((status = 201, body = BannerResponse), (status = 403, description = "Admin only")))]
pub async fn create_banner(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<BannerRequest>,
) -> Created<BannerResponse> {
    let banners = ctx.banner_repo();
    let uc = CreateBanner {
        banners: banners.as_ref(),
    };
    let banner = uc.execute(req.into()).await?;
    Ok(created(banner.into()))
}
