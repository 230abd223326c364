use uuid::Uuid;

use crate::application::ports::order_repository::OrderRepository;
use crate::application::use_cases::orders::OrderError;
use crate::domain::orders::status::OrderStatus;
use crate::domain::products::product::Review;

pub struct ReviewTransaction<'a, R: OrderRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: OrderRepository + ?Sized> ReviewTransaction<'a, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        rating: i16,
        comment: Option<String>,
    ) -> Result<Review, OrderError> {
        if !(1..=5).contains(&rating) {
            return Err(OrderError::InvalidInput("rating must be 1-5".into()));
        }
        let comment = comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        if comment.as_ref().is_some_and(|c| c.chars().count() > 1000) {
            return Err(OrderError::InvalidInput("comment is too long".into()));
        }
        let target = self
            .repo
            .find_review_target(transaction_id)
            .await?
            .filter(|t| t.buyer_id == user_id)
            .ok_or(OrderError::NotFound)?;
        if target.status != OrderStatus::Completed {
            return Err(OrderError::InvalidStatus);
        }
        self.repo
            .create_review(&target, rating, comment.as_deref())
            .await?
            .ok_or(OrderError::AlreadyReviewed)
    }
}
