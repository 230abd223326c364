pub mod address_repository;
pub mod banner_repository;
pub mod cache_port;
pub mod cart_repository;
pub mod chat_repository;
pub mod location_repository;
pub mod order_repository;
pub mod product_repository;
pub mod shop_repository;
pub mod user_repository;
pub mod voucher_repository;
pub mod wallet_repository;
