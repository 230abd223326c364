use uuid::Uuid;

use crate::application::ports::product_repository::ProductRepository;
use crate::application::use_cases::products::ProductError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::products::product::Review;

pub struct ListReviews<'a, P: ProductRepository + ?Sized> {
    pub products: &'a P,
}

impl<'a, P: ProductRepository + ?Sized> ListReviews<'a, P> {
    pub async fn execute(
        &self,
        product_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Review>, ProductError> {
        if !self.products.product_exists(product_id).await? {
            return Err(ProductError::NotFound);
        }
        let (items, total) = self.products.list_reviews(product_id, page).await?;
        Ok(Page::new(items, page, total))
    }
}
