pub mod banners;
pub mod vouchers;

#[derive(thiserror::Error, Debug)]
pub enum MarketplaceError {
    #[error("voucher code already used")]
    CodeTaken,
    #[error("category not found")]
    CategoryNotFound,
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}
