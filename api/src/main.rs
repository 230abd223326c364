use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use api::bootstrap::app_context::{AppContext, AppServices};
use api::bootstrap::config::Config;
use api::infrastructure::db::repositories::{
    address_repository_sqlx::SqlxAddressRepository, banner_repository_sqlx::SqlxBannerRepository,
    cart_repository_sqlx::SqlxCartRepository, chat_repository_sqlx::SqlxChatRepository,
    location_repository_sqlx::SqlxLocationRepository, order_repository_sqlx::SqlxOrderRepository,
    product_repository_sqlx::SqlxProductRepository, shop_repository_sqlx::SqlxShopRepository,
    user_repository_sqlx::SqlxUserRepository, voucher_repository_sqlx::SqlxVoucherRepository,
    wallet_repository_sqlx::SqlxWalletRepository,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            api::presentation::http::auth::register,
            api::presentation::http::auth::login,
            api::presentation::http::auth::logout,
            api::presentation::http::auth::step_up,
            api::presentation::http::auth::me,
            api::presentation::http::carts::list_cart,
            api::presentation::http::carts::add_to_cart,
            api::presentation::http::carts::update_cart_item,
            api::presentation::http::carts::delete_cart_item,
            api::presentation::http::chats::list_rooms,
            api::presentation::http::chats::thread_with_shop,
            api::presentation::http::chats::send_to_shop,
            api::presentation::http::chats::list_shop_rooms,
            api::presentation::http::chats::thread_with_user,
            api::presentation::http::chats::send_to_user,
            api::presentation::http::health::health,
            api::presentation::http::locations::list_provinces,
            api::presentation::http::locations::list_cities,
            api::presentation::http::locations::list_couriers,
            api::presentation::http::marketplace::list_vouchers,
            api::presentation::http::marketplace::create_voucher,
            api::presentation::http::marketplace::list_banners,
            api::presentation::http::marketplace::create_banner,
            api::presentation::http::orders::checkout,
            api::presentation::http::orders::preview_checkout,
            api::presentation::http::orders::list_orders,
            api::presentation::http::orders::get_order,
            api::presentation::http::orders::buyer_order_action,
            api::presentation::http::orders::get_invoice,
            api::presentation::http::orders::pay_invoice,
            api::presentation::http::orders::review_transaction,
            api::presentation::http::orders::list_shop_orders,
            api::presentation::http::orders::get_shop_order,
            api::presentation::http::orders::seller_order_action,
            api::presentation::http::orders::list_refunds,
            api::presentation::http::orders::decide_refund,
            api::presentation::http::products::list_categories,
            api::presentation::http::products::search_products,
            api::presentation::http::products::get_product,
            api::presentation::http::products::list_reviews,
            api::presentation::http::shops::create_shop,
            api::presentation::http::shops::my_shop,
            api::presentation::http::shops::update_shop,
            api::presentation::http::shops::set_couriers,
            api::presentation::http::shops::get_shop,
            api::presentation::http::shops::active_shop_vouchers,
            api::presentation::http::shops::create_shop_voucher,
            api::presentation::http::shops::list_shop_vouchers,
            api::presentation::http::shops::delete_shop_voucher,
            api::presentation::http::shops::create_promotion,
            api::presentation::http::shops::list_promotions,
            api::presentation::http::shops::create_product,
            api::presentation::http::shops::update_product,
            api::presentation::http::shops::update_sku,
            api::presentation::http::users::get_profile,
            api::presentation::http::users::update_profile,
            api::presentation::http::users::change_password,
            api::presentation::http::users::list_addresses,
            api::presentation::http::users::create_address,
            api::presentation::http::users::update_address,
            api::presentation::http::users::delete_address,
            api::presentation::http::users::set_default_address,
            api::presentation::http::users::list_favorites,
            api::presentation::http::users::toggle_favorite,
            api::presentation::http::wallets::activate,
            api::presentation::http::wallets::get_wallet,
            api::presentation::http::wallets::histories,
            api::presentation::http::wallets::top_up,
            api::presentation::http::wallets::change_pin,
        ),
        components(schemas(
            api::presentation::http::auth::RegisterRequest,
            api::presentation::http::auth::UserResponse,
            api::presentation::http::auth::LoginRequest,
            api::presentation::http::auth::LoginResponse,
            api::presentation::http::auth::StepUpRequest,
            api::presentation::http::auth::StepUpResponse,
            api::presentation::http::carts::CartLineResponse,
            api::presentation::http::carts::CartShopResponse,
            api::presentation::http::carts::AddToCartRequest,
            api::presentation::http::carts::UpdateCartRequest,
            api::presentation::http::chats::ChatMessageResponse,
            api::presentation::http::chats::ChatRoomResponse,
            api::presentation::http::chats::SendMessageRequest,
            api::presentation::http::health::HealthResp,
            api::presentation::http::locations::ProvinceResponse,
            api::presentation::http::locations::CityResponse,
            api::presentation::http::locations::CourierResponse,
            api::presentation::http::marketplace::MarketplaceVoucherResponse,
            api::presentation::http::marketplace::BannerResponse,
            api::presentation::http::marketplace::BannerRequest,
            api::presentation::http::orders::CheckoutItemRequest,
            api::presentation::http::orders::CheckoutShopRequest,
            api::presentation::http::orders::CheckoutRequest,
            api::presentation::http::orders::OrderActionRequest,
            api::presentation::http::orders::PayInvoiceRequest,
            api::presentation::http::orders::ReviewRequest,
            api::presentation::http::orders::InvoiceResponse,
            api::presentation::http::orders::ShopOrderResponse,
            api::presentation::http::orders::TransactionResponse,
            api::presentation::http::orders::StatusEntryResponse,
            api::presentation::http::orders::ShopOrderDetailResponse,
            api::presentation::http::orders::InvoiceDetailResponse,
            api::presentation::http::orders::PreviewLineResponse,
            api::presentation::http::orders::PreviewShopResponse,
            api::presentation::http::orders::CheckoutPreviewResponse,
            api::presentation::http::orders::PaymentResponse,
            api::presentation::http::orders::RefundResponse,
            api::presentation::http::products::CategoryResponse,
            api::presentation::http::products::ProductSummaryResponse,
            api::presentation::http::products::SkuResponse,
            api::presentation::http::products::PromotionResponse,
            api::presentation::http::products::ProductDetailResponse,
            api::presentation::http::products::ProductResponse,
            api::presentation::http::products::ReviewResponse,
            api::presentation::http::response::PageMeta,
            api::presentation::http::shops::ShopResponse,
            api::presentation::http::shops::ShopProfileResponse,
            api::presentation::http::shops::CreateShopRequest,
            api::presentation::http::shops::UpdateShopRequest,
            api::presentation::http::shops::SetCouriersRequest,
            api::presentation::http::shops::VoucherRequest,
            api::presentation::http::shops::ShopVoucherResponse,
            api::presentation::http::shops::PromotionRequest,
            api::presentation::http::shops::SkuRequest,
            api::presentation::http::shops::CreateProductRequest,
            api::presentation::http::shops::UpdateProductRequest,
            api::presentation::http::shops::UpdateSkuRequest,
            api::presentation::http::users::ProfileResponse,
            api::presentation::http::users::UpdateProfileRequest,
            api::presentation::http::users::ChangePasswordRequest,
            api::presentation::http::users::AddressResponse,
            api::presentation::http::users::AddressRequest,
            api::presentation::http::users::FavoriteRequest,
            api::presentation::http::users::FavoriteResponse,
            api::presentation::http::wallets::WalletResponse,
            api::presentation::http::wallets::WalletHistoryResponse,
            api::presentation::http::wallets::PinRequest,
            api::presentation::http::wallets::TopUpRequest,
        )),
        tags(
            (name = "Auth", description = "Registration, login and step-up confirmation"),
            (name = "Users", description = "Profile, addresses and favorites"),
            (name = "Wallets", description = "Wallet balance, history and PIN"),
            (name = "Locations", description = "Provinces, cities and couriers"),
            (name = "Catalog", description = "Categories, product search and reviews"),
            (name = "Shops", description = "Shop profile, products, vouchers and promotions"),
            (name = "Carts", description = "Shopping cart"),
            (name = "Orders", description = "Checkout, invoices and buyer order actions"),
            (name = "Seller orders", description = "Order handling and refunds for shop owners"),
            (name = "Marketplace", description = "Platform vouchers and banners"),
            (name = "Chats", description = "Buyer and seller messaging"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn cors_layer(cfg: &Config) -> CorsLayer {
    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::PUT,
        http::Method::DELETE,
        http::Method::PATCH,
        http::Method::OPTIONS,
    ];
    let headers = [http::header::CONTENT_TYPE, http::header::AUTHORIZATION];
    let base = CorsLayer::new().allow_methods(methods).allow_headers(headers);

    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        Some(Err(_)) => {
            tracing::warn!("FRONTEND_URL is not a valid origin, mirroring request origin");
            base.allow_origin(AllowOrigin::mirror_request())
                .allow_credentials(true)
        }
        // FRONTEND_URL is required in production; deny cross-origin calls if it is still missing
        None if cfg.is_production => base.allow_origin(AllowOrigin::exact(
            HeaderValue::from_static("http://invalid"),
        )),
        None => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "api=debug,axum=info,tower_http=info,sqlx=warn".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting marketplace backend");

    // Database
    let pool = api::infrastructure::db::connect_pool(&cfg.database_url, cfg.db_max_connections).await?;
    api::infrastructure::db::migrate(&pool).await?;

    // Redis when configured, in-process cache otherwise
    let cache = api::infrastructure::cache::build_cache(cfg.redis_url.as_deref()).await?;

    let services = AppServices::new(
        Arc::new(SqlxUserRepository::new(pool.clone(), cfg.encryption_key.clone())),
        Arc::new(SqlxAddressRepository::new(pool.clone())),
        Arc::new(SqlxLocationRepository::new(pool.clone())),
        Arc::new(SqlxShopRepository::new(pool.clone())),
        Arc::new(SqlxProductRepository::new(pool.clone())),
        Arc::new(SqlxCartRepository::new(pool.clone())),
        Arc::new(SqlxVoucherRepository::new(pool.clone())),
        Arc::new(SqlxOrderRepository::new(pool.clone())),
        Arc::new(SqlxWalletRepository::new(pool.clone())),
        Arc::new(SqlxBannerRepository::new(pool.clone())),
        Arc::new(SqlxChatRepository::new(pool.clone())),
        cache,
    );

    let ctx = AppContext::new(cfg.clone(), services);

    let app = api::presentation::http::router::build_router(ctx, pool.clone())
        .merge(SwaggerUi::new("/v1/docs").url("/v1/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&cfg))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    });

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, "API server task failed"),
        Err(e) => error!(?e, "API server task panicked"),
    }
    pool.close().await;
    Ok(())
}
