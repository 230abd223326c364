use crate::application::ports::product_repository::ProductRepository;
use crate::application::use_cases::products::ProductError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::products::product::{Category, ProductQuery, ProductSummary};

pub struct ListCategories<'a, P: ProductRepository + ?Sized> {
    pub products: &'a P,
}

impl<'a, P: ProductRepository + ?Sized> ListCategories<'a, P> {
    pub async fn execute(&self) -> anyhow::Result<Vec<Category>> {
        self.products.list_categories().await
    }
}

pub struct SearchProducts<'a, P: ProductRepository + ?Sized> {
    pub products: &'a P,
}

impl<'a, P: ProductRepository + ?Sized> SearchProducts<'a, P> {
    pub async fn execute(
        &self,
        mut query: ProductQuery,
        page: PageRequest,
    ) -> Result<Page<ProductSummary>, ProductError> {
        query.q = query
            .q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(ProductError::InvalidInput(
                    "min_price must not exceed max_price".into(),
                ));
            }
        }
        let (items, total) = self.products.search(&query, page).await?;
        Ok(Page::new(items, page, total))
    }
}
