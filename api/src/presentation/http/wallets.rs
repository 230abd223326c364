use axum::{
    Router,
    extract::{Query, State},
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::wallets::activate::ActivateWallet;
use crate::application::use_cases::wallets::change_pin::ChangePin;
use crate::application::use_cases::wallets::get_wallet::{GetWallet, WalletHistoryList};
use crate::application::use_cases::wallets::top_up::TopUp;
use crate::bootstrap::app_context::AppContext;
use crate::domain::wallets::wallet::{Wallet, WalletHistory};
use crate::presentation::http::auth::{AuthUser, StepUpUser};
use crate::presentation::http::error::ApiJson;
use crate::presentation::http::response::{
    ApiResult, Created, PageQuery, Paged, created, ok, with_message,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletResponse {
    pub id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(w: Wallet) -> Self {
        Self {
            id: w.id,
            balance: w.balance,
            created_at: w.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletHistoryResponse {
    pub id: Uuid,
    /// Signed: credits positive, debits negative
    pub amount: Decimal,
    /// `top_up`, `payment`, `refund` or `income`
    pub kind: String,
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<WalletHistory> for WalletHistoryResponse {
    fn from(h: WalletHistory) -> Self {
        Self {
            id: h.id,
            amount: h.amount,
            kind: h.kind.as_str().to_string(),
            reference_id: h.reference_id,
            created_at: h.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PinRequest {
    /// Six digits
    pub pin: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TopUpRequest {
    pub amount: Decimal,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/wallets", post(activate))
        .route("/wallets/me", get(get_wallet))
        .route("/wallets/me/histories", get(histories))
        .route("/wallets/me/top-up", post(top_up))
        .route("/wallets/me/pin", put(change_pin))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/v1/wallets", tag = "Wallets", request_body = PinRequest,
    responses((status = 201, body = WalletResponse)))]
pub async fn activate(
    State(ctx): State<AppContext>,
    user: AuthUser,
    ApiJson(req): ApiJson<PinRequest>,
) -> Created<WalletResponse> {
    let repo = ctx.wallet_repo();
    let uc = ActivateWallet {
        repo: repo.as_ref(),
    };
    let wallet = uc.execute(user.id, &req.pin).await?;
    Ok(created(wallet.into()))
}

#[utoipa::path(get, path = "/v1/wallets/me", tag = "Wallets", responses((status = 200, body = WalletResponse)))]
pub async fn get_wallet(State(ctx): State<AppContext>, user: AuthUser) -> ApiResult<WalletResponse> {
    let repo = ctx.wallet_repo();
    let uc = GetWallet {
        repo: repo.as_ref(),
    };
    Ok(ok(uc.execute(user.id).await?.into()))
}

#[utoipa::path(get, path = "/v1/wallets/me/histories", tag = "Wallets", params(PageQuery),
    responses((status = 200, body = [WalletHistoryResponse])))]
pub async fn histories(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<Paged<WalletHistoryResponse>> {
    let repo = ctx.wallet_repo();
    let uc = WalletHistoryList {
        repo: repo.as_ref(),
    };
    let page = uc.execute(user.id, page.request()).await?;
    Ok(ok(Paged::from_page(page)))
}

#[utoipa::path(post, path = "/v1/wallets/me/top-up", tag = "Wallets", request_body = TopUpRequest,
    responses((status = 200, body = WalletResponse), (status = 401, description = "Step-up required")))]
pub async fn top_up(
    State(ctx): State<AppContext>,
    StepUpUser(user): StepUpUser,
    ApiJson(req): ApiJson<TopUpRequest>,
) -> ApiResult<WalletResponse> {
    let repo = ctx.wallet_repo();
    let uc = TopUp {
        repo: repo.as_ref(),
    };
    let wallet = uc.execute(user.id, req.amount).await?;
    Ok(with_message("top up success", wallet.into()))
}

#[utoipa::path(put, path = "/v1/wallets/me/pin", tag = "Wallets", request_body = PinRequest,
    responses((status = 200), (status = 401, description = "Step-up required")))]
pub async fn change_pin(
    State(ctx): State<AppContext>,
    StepUpUser(user): StepUpUser,
    ApiJson(req): ApiJson<PinRequest>,
) -> ApiResult<()> {
    let repo = ctx.wallet_repo();
    let uc = ChangePin {
        repo: repo.as_ref(),
    };
    uc.execute(user.id, &req.pin).await?;
    Ok(with_message("pin changed", ()))
}
