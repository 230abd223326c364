pub mod auth;
pub mod carts;
pub mod chats;
pub mod error;
pub mod health;
pub mod locations;
pub mod marketplace;
pub mod orders;
pub mod products;
pub mod response;
pub mod router;
pub mod shops;
pub mod users;
pub mod wallets;
