pub mod addresses;
pub mod auth;
pub mod carts;
pub mod chats;
pub mod locations;
pub mod marketplace;
pub mod orders;
pub mod products;
pub mod shops;
pub mod users;
pub mod wallets;
