use uuid::Uuid;

use crate::application::ports::product_repository::ProductRepository;
use crate::application::use_cases::products::ProductError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::products::product::ProductSummary;

pub struct Favorites<'a, P: ProductRepository + ?Sized> {
    pub products: &'a P,
}

impl<'a, P: ProductRepository + ?Sized> Favorites<'a, P> {
    pub async fn toggle(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, ProductError> {
        if !self.products.product_exists(product_id).await? {
            return Err(ProductError::NotFound);
        }
        Ok(self.products.toggle_favorite(user_id, product_id).await?)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ProductSummary>, ProductError> {
        let (items, total) = self.products.list_favorites(user_id, page).await?;
        Ok(Page::new(items, page, total))
    }
}
