pub mod checkout;
pub mod lifecycle;
pub mod list_orders;
pub mod refunds;
pub mod review;

#[derive(thiserror::Error, Debug)]
pub enum OrderError {
    #[error("order not found")]
    NotFound,
    #[error("open a shop first")]
    ShopRequired,
    #[error("action not allowed for this party")]
    Forbidden,
    #[error("order status does not allow this action")]
    InvalidStatus,
    #[error("refund request not found")]
    RefundNotFound,
    #[error("transaction already reviewed")]
    AlreadyReviewed,
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}
