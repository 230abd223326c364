use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::chats::Chats;
use crate::bootstrap::app_context::AppContext;
use crate::domain::chats::chat::{ChatMessage, ChatRoom};
use crate::presentation::http::auth::AuthUser;
use crate::presentation::http::error::ApiJson;
use crate::presentation::http::response::{ApiResult, Created, PageQuery, Paged, created, ok};

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatMessageResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shop_id: Uuid,
    /// `user` or `shop`
    pub sender: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            shop_id: m.shop_id,
            sender: m.sender.as_str().to_string(),
            message: m.message,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatRoomResponse {
    /// Shop id for a buyer, user id for a seller
    pub counterpart_id: Uuid,
    pub counterpart_name: String,
    pub last_message: String,
    pub last_sender: String,
    pub last_at: DateTime<Utc>,
}

impl From<ChatRoom> for ChatRoomResponse {
    fn from(r: ChatRoom) -> Self {
        Self {
            counterpart_id: r.counterpart_id,
            counterpart_name: r.counterpart_name,
            last_message: r.last_message,
            last_sender: r.last_sender.as_str().to_string(),
            last_at: r.last_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub message: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/chats", get(list_rooms))
        .route(
            "/chats/shops/:shop_id",
            get(thread_with_shop).post(send_to_shop),
        )
        .route("/shops/me/chats", get(list_shop_rooms))
        .route(
            "/shops/me/chats/:user_id",
            get(thread_with_user).post(send_to_user),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/v1/chats", tag = "Chats",
    responses((status = 200, body = [ChatRoomResponse])))]
pub async fn list_rooms(
    State(ctx): State<AppContext>,
    user: AuthUser,
) -> ApiResult<Vec<ChatRoomResponse>> {
    let repo = ctx.chat_repo();
    let shops = ctx.shop_repo();
    let uc = Chats {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    let rooms = uc.rooms_for_user(user.id).await?;
    Ok(ok(rooms.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/v1/chats/shops/{shop_id}", tag = "Chats",
    params(("shop_id" = Uuid, Path, description = "Shop ID"), PageQuery),
    responses((status = 200, body = [ChatMessageResponse])))]
pub async fn thread_with_shop(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(shop_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Paged<ChatMessageResponse>> {
    let repo = ctx.chat_repo();
    let shops = ctx.shop_repo();
    let uc = Chats {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    let page = uc.thread_with_shop(user.id, shop_id, page.request()).await?;
    Ok(ok(Paged::from_page(page)))
}

#[utoipa::path(post, path = "/v1/chats/shops/{shop_id}", tag = "Chats", request_body = SendMessageRequest,
    params(("shop_id" = Uuid, Path, description = "Shop ID")),
    responses((status = 201, body = ChatMessageResponse)))]
pub async fn send_to_shop(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(shop_id): Path<Uuid>,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Created<ChatMessageResponse> {
    let repo = ctx.chat_repo();
    let shops = ctx.shop_repo();
    let uc = Chats {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    let msg = uc.send_to_shop(user.id, shop_id, &req.message).await?;
    Ok(created(msg.into()))
}

#[utoipa::path(get, path = "/v1/shops/me/chats", tag = "Chats",
    responses((status = 200, body = [ChatRoomResponse])))]
pub async fn list_shop_rooms(
    State(ctx): State<AppContext>,
    user: AuthUser,
) -> ApiResult<Vec<ChatRoomResponse>> {
    let repo = ctx.chat_repo();
    let shops = ctx.shop_repo();
    let uc = Chats {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    let rooms = uc.rooms_for_shop(user.id).await?;
    Ok(ok(rooms.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/v1/shops/me/chats/{user_id}", tag = "Chats",
    params(("user_id" = Uuid, Path, description = "Buyer ID"), PageQuery),
    responses((status = 200, body = [ChatMessageResponse])))]
pub async fn thread_with_user(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Paged<ChatMessageResponse>> {
    let repo = ctx.chat_repo();
    let shops = ctx.shop_repo();
    let uc = Chats {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    let page = uc.thread_with_user(user.id, user_id, page.request()).await?;
    Ok(ok(Paged::from_page(page)))
}

#[utoipa::path(post, path = "/v1/shops/me/chats/{user_id}", tag = "Chats", request_body = SendMessageRequest,
    params(("user_id" = Uuid, Path, description = "Buyer ID")),
    responses((status = 201, body = ChatMessageResponse)))]
pub async fn send_to_user(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Created<ChatMessageResponse> {
    let repo = ctx.chat_repo();
    let shops = ctx.shop_repo();
    let uc = Chats {
        repo: repo.as_ref(),
        shops: shops.as_ref(),
    };
    let msg = uc.send_to_user(user.id, user_id, &req.message).await?;
    Ok(created(msg.into()))
}
