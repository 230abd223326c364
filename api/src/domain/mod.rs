pub mod chats;
pub mod locations;
pub mod marketplace;
pub mod orders;
pub mod pagination;
pub mod pricing;
pub mod products;
pub mod shops;
pub mod users;
pub mod wallets;
