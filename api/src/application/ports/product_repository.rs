use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::pagination::PageRequest;
use crate::domain::products::product::{
    Category, NewProduct, NewPromotion, Product, ProductDetail, ProductQuery, ProductSummary,
    ProductUpdate, Promotion, Review, Sku, SkuRef, SkuUpdate,
};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_categories(&self) -> anyhow::Result<Vec<Category>>;
    async fn category_exists(&self, id: i32) -> anyhow::Result<bool>;
    async fn slug_exists(&self, slug: &str) -> anyhow::Result<bool>;
    // Inserts the product and its SKUs in one transaction
    async fn create_product(
        &self,
        shop_id: Uuid,
        product: &NewProduct,
    ) -> anyhow::Result<ProductDetail>;
    async fn update_product(
        &self,
        shop_id: Uuid,
        product_id: Uuid,
        update: &ProductUpdate,
    ) -> anyhow::Result<Option<Product>>;
    // Returns the updated SKU and the slug of its product
    async fn update_sku(
        &self,
        shop_id: Uuid,
        sku_id: Uuid,
        update: &SkuUpdate,
    ) -> anyhow::Result<Option<(Sku, String)>>;
    async fn get_owned(&self, shop_id: Uuid, product_id: Uuid) -> anyhow::Result<Option<Product>>;
    async fn search(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ProductSummary>, i64)>;
    async fn get_detail_by_slug(&self, slug: &str) -> anyhow::Result<Option<ProductDetail>>;
    async fn find_sku(&self, sku_id: Uuid) -> anyhow::Result<Option<SkuRef>>;
    async fn active_promotion(
        &self,
        product_id: Uuid,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<Option<Promotion>>;
    async fn create_promotion(
        &self,
        shop_id: Uuid,
        promotion: &NewPromotion,
    ) -> anyhow::Result<Promotion>;
    async fn list_promotions(&self, shop_id: Uuid) -> anyhow::Result<Vec<Promotion>>;
    async fn list_reviews(
        &self,
        product_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<Review>, i64)>;
    // Returns true when the product is now a favorite
    async fn toggle_favorite(&self, user_id: Uuid, product_id: Uuid) -> anyhow::Result<bool>;
    async fn list_favorites(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ProductSummary>, i64)>;
    async fn product_exists(&self, product_id: Uuid) -> anyhow::Result<bool>;
}
