use axum::Router;
use sqlx::PgPool;

use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::{
    auth, carts, chats, health, locations, marketplace, orders, products, shops, users, wallets,
};

/// All versioned API routes. Docs, CORS and tracing layers are added by the binary.
pub fn build_router(ctx: AppContext, pool: PgPool) -> Router {
    let v1 = Router::new()
        .merge(health::routes(pool))
        .merge(users::routes(ctx.clone()))
        .merge(wallets::routes(ctx.clone()))
        .merge(locations::routes(ctx.clone()))
        .merge(products::routes(ctx.clone()))
        .merge(shops::routes(ctx.clone()))
        .merge(carts::routes(ctx.clone()))
        .merge(orders::routes(ctx.clone()))
        .merge(marketplace::routes(ctx.clone()))
        .merge(chats::routes(ctx.clone()));

    Router::new()
        .nest("/v1/auth", auth::routes(ctx))
        .nest("/v1", v1)
}
