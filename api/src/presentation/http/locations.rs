use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::dto::locations::{CityDto, ProvinceDto};
use crate::application::use_cases::locations::Locations;
use crate::bootstrap::app_context::AppContext;
use crate::domain::locations::location::Courier;
use crate::presentation::http::response::{ApiResult, ok};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProvinceResponse {
    pub id: i32,
    pub name: String,
}

impl From<ProvinceDto> for ProvinceResponse {
    fn from(p: ProvinceDto) -> Self {
        Self {
            id: p.id,
            name: p.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CityResponse {
    pub id: i32,
    pub province_id: i32,
    pub name: String,
}

impl From<CityDto> for CityResponse {
    fn from(c: CityDto) -> Self {
        Self {
            id: c.id,
            province_id: c.province_id,
            name: c.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourierResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub base_fee: Decimal,
    /// Charged per started kilogram
    pub per_kg_fee: Decimal,
}

impl From<Courier> for CourierResponse {
    fn from(c: Courier) -> Self {
        Self {
            id: c.id,
            code: c.code,
            name: c.name,
            base_fee: c.base_fee,
            per_kg_fee: c.per_kg_fee,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/provinces", get(list_provinces))
        .route("/provinces/:id/cities", get(list_cities))
        .route("/couriers", get(list_couriers))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/v1/provinces", tag = "Locations", security(()),
    responses((status = 200, body = [ProvinceResponse])))]
pub async fn list_provinces(State(ctx): State<AppContext>) -> ApiResult<Vec<ProvinceResponse>> {
    let repo = ctx.location_repo();
    let cache = ctx.cache();
    let uc = Locations {
        repo: repo.as_ref(),
        cache: cache.as_ref(),
        ttl_secs: ctx.cfg.cache_ttl_secs,
    };
    let items = uc.provinces().await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/v1/provinces/{id}/cities", tag = "Locations", security(()),
    params(("id" = i32, Path, description = "Province ID")),
    responses((status = 200, body = [CityResponse])))]
pub async fn list_cities(
    State(ctx): State<AppContext>,
    Path(province_id): Path<i32>,
) -> ApiResult<Vec<CityResponse>> {
    let repo = ctx.location_repo();
    let cache = ctx.cache();
    let uc = Locations {
        repo: repo.as_ref(),
        cache: cache.as_ref(),
        ttl_secs: ctx.cfg.cache_ttl_secs,
    };
    let items = uc.cities(province_id).await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/v1/couriers", tag = "Locations", security(()),
    responses((status = 200, body = [CourierResponse])))]
pub async fn list_couriers(State(ctx): State<AppContext>) -> ApiResult<Vec<CourierResponse>> {
    let repo = ctx.location_repo();
    let cache = ctx.cache();
    let uc = Locations {
        repo: repo.as_ref(),
        cache: cache.as_ref(),
        ttl_secs: ctx.cfg.cache_ttl_secs,
    };
    let items = uc.couriers().await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}
