use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::addresses::create_address::CreateAddress;
use crate::application::use_cases::addresses::delete_address::DeleteAddress;
use crate::application::use_cases::addresses::list_addresses::ListAddresses;
use crate::application::use_cases::addresses::set_default::SetDefaultAddress;
use crate::application::use_cases::addresses::update_address::UpdateAddress;
use crate::application::use_cases::products::favorites::Favorites;
use crate::application::use_cases::users::change_password::ChangePassword;
use crate::application::use_cases::users::profile::{GetProfile, UpdateProfile};
use crate::bootstrap::app_context::AppContext;
use crate::domain::users::user::{Address, NewAddress, ProfileUpdate, User, UserProfile};
use crate::presentation::http::auth::AuthUser;
use crate::presentation::http::error::ApiJson;
use crate::presentation::http::products::ProductSummaryResponse;
use crate::presentation::http::response::{
    ApiResult, Created, PageQuery, Paged, created, ok, with_message,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar_url: Option<String>,
}

impl From<(User, UserProfile)> for ProfileResponse {
    fn from((user, profile): (User, UserProfile)) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            phone: profile.phone,
            gender: profile.gender,
            birth_date: profile.birth_date,
            avatar_url: profile.avatar_url,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    /// `male` or `female`
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressResponse {
    pub id: Uuid,
    pub label: String,
    pub recipient: String,
    pub phone: String,
    pub province_id: i32,
    pub city_id: i32,
    pub street: String,
    pub postal_code: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Address> for AddressResponse {
    fn from(a: Address) -> Self {
        Self {
            id: a.id,
            label: a.label,
            recipient: a.recipient,
            phone: a.phone,
            province_id: a.province_id,
            city_id: a.city_id,
            street: a.street,
            postal_code: a.postal_code,
            is_default: a.is_default,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddressRequest {
    pub label: String,
    pub recipient: String,
    pub phone: String,
    pub province_id: i32,
    pub city_id: i32,
    pub street: String,
    pub postal_code: String,
}

impl From<AddressRequest> for NewAddress {
    fn from(r: AddressRequest) -> Self {
        Self {
            label: r.label,
            recipient: r.recipient,
            phone: r.phone,
            province_id: r.province_id,
            city_id: r.city_id,
            street: r.street,
            postal_code: r.postal_code,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FavoriteRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteResponse {
    pub product_id: Uuid,
    pub favorited: bool,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/users/me/profile", get(get_profile).put(update_profile))
        .route("/users/me/password", put(change_password))
        .route(
            "/users/me/addresses",
            get(list_addresses).post(create_address),
        )
        .route(
            "/users/me/addresses/:id",
            put(update_address).delete(delete_address),
        )
        .route("/users/me/addresses/:id/default", put(set_default_address))
        .route(
            "/users/me/favorites",
            get(list_favorites).post(toggle_favorite),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/v1/users/me/profile", tag = "Users", responses((status = 200, body = ProfileResponse)))]
pub async fn get_profile(State(ctx): State<AppContext>, user: AuthUser) -> ApiResult<ProfileResponse> {
    let repo = ctx.user_repo();
    let uc = GetProfile {
        repo: repo.as_ref(),
    };
    Ok(ok(uc.execute(user.id).await?.into()))
}

#[utoipa::path(put, path = "/v1/users/me/profile", tag = "Users", request_body = UpdateProfileRequest,
    responses((status = 200, body = ProfileResponse)))]
pub async fn update_profile(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<ProfileResponse> {
    let repo = ctx.user_repo();
    let uc = UpdateProfile {
        repo: repo.as_ref(),
    };
    let update = ProfileUpdate {
        full_name: req.full_name,
        phone: req.phone,
        gender: req.gender,
        birth_date: req.birth_date,
        avatar_url: req.avatar_url,
    };
    Ok(with_message("profile updated", uc.execute(user.id, update).await?.into()))
}

#[utoipa::path(put, path = "/v1/users/me/password", tag = "Users", request_body = ChangePasswordRequest,
    responses((status = 200)))]
pub async fn change_password(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    let repo = ctx.user_repo();
    let uc = ChangePassword {
        repo: repo.as_ref(),
    };
    uc.execute(user.id, &req.current_password, &req.new_password)
        .await?;
    Ok(with_message("password changed", ()))
}

#[utoipa::path(get, path = "/v1/users/me/addresses", tag = "Users", responses((status = 200, body = [AddressResponse])))]
pub async fn list_addresses(
    State(ctx): State<AppContext>,
    user: AuthUser,
) -> ApiResult<Vec<AddressResponse>> {
    let repo = ctx.address_repo();
    let uc = ListAddresses {
        repo: repo.as_ref(),
    };
    let items = uc.execute(user.id).await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/v1/users/me/addresses", tag = "Users", request_body = AddressRequest,
    responses((status = 201, body = AddressResponse)))]
pub async fn create_address(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<AddressRequest>,
) -> Created<AddressResponse> {
    let repo = ctx.address_repo();
    let locations = ctx.location_repo();
    let uc = CreateAddress {
        repo: repo.as_ref(),
        locations: locations.as_ref(),
    };
    let address = uc.execute(user.id, req.into()).await?;
    Ok(created(address.into()))
}

#[utoipa::path(put, path = "/v1/users/me/addresses/{id}", tag = "Users", request_body = AddressRequest,
    params(("id" = Uuid, Path, description = "Address ID")),
    responses((status = 200, body = AddressResponse)))]
pub async fn update_address(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<AddressRequest>,
) -> ApiResult<AddressResponse> {
    let repo = ctx.address_repo();
    let locations = ctx.location_repo();
    let uc = UpdateAddress {
        repo: repo.as_ref(),
        locations: locations.as_ref(),
    };
    let address = uc.execute(user.id, id, req.into()).await?;
    Ok(ok(address.into()))
}

#[utoipa::path(delete, path = "/v1/users/me/addresses/{id}", tag = "Users",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses((status = 200)))]
pub async fn delete_address(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let repo = ctx.address_repo();
    let shops = ctx.shop_repo();
    let uc = DeleteAddress {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    uc.execute(user.id, id).await?;
    Ok(with_message("address deleted", ()))
}

#[utoipa::path(put, path = "/v1/users/me/addresses/{id}/default", tag = "Users",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses((status = 200)))]
pub async fn set_default_address(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let repo = ctx.address_repo();
    let uc = SetDefaultAddress {
        repo: repo.as_ref(),
    };
    uc.execute(user.id, id).await?;
    Ok(with_message("default address updated", ()))
}

#[utoipa::path(get, path = "/v1/users/me/favorites", tag = "Users", params(PageQuery),
    responses((status = 200, body = [ProductSummaryResponse])))]
pub async fn list_favorites(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<Paged<ProductSummaryResponse>> {
    let products = ctx.product_repo();
    let uc = Favorites {
        products: products.as_ref(),
    };
    let page = uc.list(user.id, page.request()).await?;
    Ok(ok(Paged::from_page(page)))
}

#[utoipa::path(post, path = "/v1/users/me/favorites", tag = "Users", request_body = FavoriteRequest,
    responses((status = 200, body = FavoriteResponse)))]
pub async fn toggle_favorite(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<FavoriteRequest>,
) -> ApiResult<FavoriteResponse> {
    let products = ctx.product_repo();
    let uc = Favorites {
        products: products.as_ref(),
    };
    let favorited = uc.toggle(user.id, req.product_id).await?;
    Ok(ok(FavoriteResponse {
        product_id: req.product_id,
        favorited,
    }))
}
