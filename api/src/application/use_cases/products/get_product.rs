use crate::application::dto::products::ProductDetailDto;
use crate::application::ports::cache_port::CachePort;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::services::cache;
use crate::application::use_cases::products::ProductError;

/// Product page by slug, served from the cache when possible.
pub struct GetProduct<'a, P, C>
where
    P: ProductRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub products: &'a P,
    pub cache: &'a C,
    pub ttl_secs: u64,
}

impl<'a, P, C> GetProduct<'a, P, C>
where
    P: ProductRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub async fn execute(&self, slug: &str) -> Result<ProductDetailDto, ProductError> {
        let key = cache::product_key(slug);
        if let Some(hit) = cache::get_json::<_, ProductDetailDto>(self.cache, &key).await {
            return Ok(hit);
        }
        let detail = self
            .products
            .get_detail_by_slug(slug)
            .await?
            .filter(|d| !d.product.is_archived)
            .ok_or(ProductError::NotFound)?;
        let promotion = self
            .products
            .active_promotion(detail.product.id, chrono::Utc::now())
            .await?;
        let dto = ProductDetailDto::from_domain(detail, promotion);
        cache::set_json(self.cache, &key, &dto, self.ttl_secs).await;
        Ok(dto)
    }
}
