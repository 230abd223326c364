pub mod locations;
pub mod products;
