pub mod catalog;
pub mod create_product;
pub mod favorites;
pub mod get_product;
pub mod reviews;
pub mod update_product;

#[derive(thiserror::Error, Debug)]
pub enum ProductError {
    #[error("open a shop first")]
    ShopRequired,
    #[error("product not found")]
    NotFound,
    #[error("sku not found")]
    SkuNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}
