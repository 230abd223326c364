pub mod address_repository_sqlx;
pub mod banner_repository_sqlx;
pub mod cart_repository_sqlx;
pub mod chat_repository_sqlx;
pub mod location_repository_sqlx;
pub mod order_repository_sqlx;
pub mod product_repository_sqlx;
pub mod shop_repository_sqlx;
pub mod user_repository_sqlx;
pub mod voucher_repository_sqlx;
pub mod wallet_repository_sqlx;
