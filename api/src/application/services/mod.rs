pub mod cache;
pub mod hashing;
