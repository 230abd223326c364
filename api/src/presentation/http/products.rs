use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::dto::products::{ProductDetailDto, SkuDto};
use crate::application::use_cases::products::catalog::{ListCategories, SearchProducts};
use crate::application::use_cases::products::get_product::GetProduct;
use crate::application::use_cases::products::reviews::ListReviews;
use crate::bootstrap::app_context::AppContext;
use crate::domain::products::product::{
    Category, Product, ProductQuery, ProductSort, ProductSummary, Promotion, Review, Sku,
};
use crate::presentation::http::error::ApiError;
use crate::presentation::http::response::{ApiResult, PageQuery, Paged, ok};

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i32>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            parent_id: c.parent_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub shop_id: Uuid,
    pub shop_name: String,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub sold_count: i32,
    pub rating: Option<f64>,
}

impl From<ProductSummary> for ProductSummaryResponse {
    fn from(p: ProductSummary) -> Self {
        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
            shop_id: p.shop_id,
            shop_name: p.shop_name,
            min_price: p.min_price,
            max_price: p.max_price,
            sold_count: p.sold_count,
            rating: p.rating,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SkuResponse {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    /// Unit price with the running promotion applied, if any
    pub promo_price: Option<Decimal>,
    pub stock: i32,
    pub weight_grams: i32,
    pub bulk_price: Option<Decimal>,
    pub bulk_min_quantity: Option<i32>,
}

impl From<Sku> for SkuResponse {
    fn from(s: Sku) -> Self {
        Self {
            id: s.id,
            name: s.name,
            price: s.price,
            promo_price: None,
            stock: s.stock,
            weight_grams: s.weight_grams,
            bulk_price: s.bulk_price,
            bulk_min_quantity: s.bulk_min_quantity,
        }
    }
}

impl SkuResponse {
    fn from_dto(s: SkuDto, promo_price: Option<Decimal>) -> Self {
        Self {
            id: s.id,
            name: s.name,
            price: s.price,
            promo_price,
            stock: s.stock,
            weight_grams: s.weight_grams,
            bulk_price: s.bulk_price,
            bulk_min_quantity: s.bulk_min_quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromotionResponse {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub name: String,
    pub discount_type: String,
    pub amount: Decimal,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl From<Promotion> for PromotionResponse {
    fn from(p: Promotion) -> Self {
        Self {
            id: p.id,
            product_id: Some(p.product_id),
            name: p.name,
            discount_type: p.discount_type.as_str().to_string(),
            amount: p.amount,
            start_at: p.start_at,
            end_at: p.end_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailResponse {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub shop_name: String,
    pub shop_slug: String,
    pub category_id: i32,
    pub category_name: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub sold_count: i32,
    pub favorite_count: i32,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub skus: Vec<SkuResponse>,
    pub promotion: Option<PromotionResponse>,
    pub created_at: DateTime<Utc>,
}

impl ProductDetailResponse {
    /// Drops a cached promotion whose window has closed.
    pub fn from_dto(dto: ProductDetailDto, now: DateTime<Utc>) -> Self {
        let product_id = dto.id;
        let skus = dto
            .skus
            .iter()
            .cloned()
            .map(|s| {
                let promo = dto.promo_price(&s, now);
                SkuResponse::from_dto(s, promo)
            })
            .collect();
        let promotion = dto
            .promotion
            .filter(|p| p.is_active(now))
            .map(|p| PromotionResponse {
                id: p.id,
                product_id: Some(product_id),
                name: p.name,
                discount_type: p.discount_type,
                amount: p.amount,
                start_at: p.start_at,
                end_at: p.end_at,
            });
        Self {
            id: dto.id,
            shop_id: dto.shop_id,
            shop_name: dto.shop_name,
            shop_slug: dto.shop_slug,
            category_id: dto.category_id,
            category_name: dto.category_name,
            name: dto.name,
            slug: dto.slug,
            description: dto.description,
            sold_count: dto.sold_count,
            favorite_count: dto.favorite_count,
            rating: dto.rating,
            review_count: dto.review_count,
            skus,
            promotion,
            created_at: dto.created_at,
        }
    }
}

/// Seller view of a product after an edit.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub category_id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_archived: bool,
    pub sold_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            shop_id: p.shop_id,
            category_id: p.category_id,
            name: p.name,
            slug: p.slug,
            description: p.description,
            is_archived: p.is_archived,
            sold_count: p.sold_count,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub username: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            transaction_id: r.transaction_id,
            product_id: r.product_id,
            username: r.username,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Matches product names
    pub q: Option<String>,
    pub category_id: Option<i32>,
    pub shop_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// `newest`, `price_asc`, `price_desc` or `best_selling`
    pub sort: Option<String>,
}

impl From<SearchQuery> for ProductQuery {
    fn from(q: SearchQuery) -> Self {
        Self {
            sort: ProductSort::parse(q.sort.as_deref()),
            q: q.q,
            category_id: q.category_id,
            shop_id: q.shop_id,
            min_price: q.min_price,
            max_price: q.max_price,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/products", get(search_products))
        .route("/products/:slug", get(get_product))
        .route("/products/:slug/reviews", get(list_reviews))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/v1/categories", tag = "Catalog", security(()),
    responses((status = 200, body = [CategoryResponse])))]
pub async fn list_categories(State(ctx): State<AppContext>) -> ApiResult<Vec<CategoryResponse>> {
    let products = ctx.product_repo();
    let uc = ListCategories {
        products: products.as_ref(),
    };
    let items = uc.execute().await?;
    Ok(ok(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/v1/products", tag = "Catalog", security(()), params(SearchQuery, PageQuery),
    responses((status = 200, body = [ProductSummaryResponse])))]
pub async fn search_products(
    State(ctx): State<AppContext>,
    Query(query): Query<SearchQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Paged<ProductSummaryResponse>> {
    let products = ctx.product_repo();
    let uc = SearchProducts {
        products: products.as_ref(),
    };
    let page = uc.execute(query.into(), page.request()).await?;
    Ok(ok(Paged::from_page(page)))
}

async fn load_product(ctx: &AppContext, slug: &str) -> Result<ProductDetailDto, ApiError> {
    let products = ctx.product_repo();
    let cache = ctx.cache();
    let uc = GetProduct {
        products: products.as_ref(),
        cache: cache.as_ref(),
        ttl_secs: ctx.cfg.cache_ttl_secs,
    };
    Ok(uc.execute(slug).await?)
}

#[utoipa::path(get, path = "/v1/products/{slug}", tag = "Catalog", security(()),
    params(("slug" = String, Path, description = "Product slug")),
    responses((status = 200, body = ProductDetailResponse)))]
pub async fn get_product(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
) -> ApiResult<ProductDetailResponse> {
    let dto = load_product(&ctx, &slug).await?;
    Ok(ok(ProductDetailResponse::from_dto(dto, Utc::now())))
}

#[utoipa::path(get, path = "/v1/products/{slug}/reviews", tag = "Catalog", security(()),
    params(("slug" = String, Path, description = "Product slug"), PageQuery),
    responses((status = 200, body = [ReviewResponse])))]
pub async fn list_reviews(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Paged<ReviewResponse>> {
    let dto = load_product(&ctx, &slug).await?;
    let products = ctx.product_repo();
    let uc = ListReviews {
        products: products.as_ref(),
    };
    let page = uc.execute(dto.id, page.request()).await?;
    Ok(ok(Paged::from_page(page)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::products::PromotionDto;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn detail(promotion: Option<PromotionDto>) -> ProductDetailDto {
        ProductDetailDto {
            id: Uuid::new_v4(),
            shop_id: Uuid::new_v4(),
            shop_name: "Toko Budi".into(),
            shop_slug: "toko-budi".into(),
            category_id: 1,
            category_name: "Fashion".into(),
            name: "Kaos Polos".into(),
            slug: "kaos-polos".into(),
            description: String::new(),
            sold_count: 0,
            favorite_count: 0,
            rating: None,
            review_count: 0,
            skus: vec![SkuDto {
                id: Uuid::new_v4(),
                name: "M".into(),
                price: dec!(50000),
                stock: 10,
                weight_grams: 200,
                bulk_price: None,
                bulk_min_quantity: None,
            }],
            promotion,
            created_at: Utc::now(),
        }
    }

    fn promo(start: DateTime<Utc>, end: DateTime<Utc>) -> PromotionDto {
        PromotionDto {
            id: Uuid::new_v4(),
            name: "Flash sale".into(),
            discount_type: "percent".into(),
            amount: dec!(10),
            start_at: start,
            end_at: end,
        }
    }

    #[test]
    fn running_promotion_sets_promo_price() {
        let now = Utc::now();
        let dto = detail(Some(promo(now - Duration::hours(1), now + Duration::hours(1))));
        let res = ProductDetailResponse::from_dto(dto, now);
        assert!(res.promotion.is_some());
        assert_eq!(res.skus[0].promo_price, Some(dec!(45000)));
    }

    #[test]
    fn expired_cached_promotion_is_hidden() {
        let now = Utc::now();
        let dto = detail(Some(promo(now - Duration::hours(2), now - Duration::hours(1))));
        let res = ProductDetailResponse::from_dto(dto, now);
        assert!(res.promotion.is_none());
        assert_eq!(res.skus[0].promo_price, None);
        assert_eq!(res.skus[0].price, dec!(50000));
    }

    #[test]
    fn sort_param_defaults_to_newest() {
        let q = SearchQuery {
            q: None,
            category_id: None,
            shop_id: None,
            min_price: None,
            max_price: None,
            sort: Some("bogus".into()),
        };
        assert_eq!(ProductQuery::from(q).sort, ProductSort::Newest);
    }
}
