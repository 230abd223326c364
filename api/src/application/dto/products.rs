use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pricing::{self, Discount, DiscountType};
use crate::domain::products::product::{ProductDetail, Promotion, Sku};

/// Product page as stored in the cache. The promotion keeps its window so a
/// cached entry stops applying it once it ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetailDto {
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
    pub skus: Vec<SkuDto>,
    pub promotion: Option<PromotionDto>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuDto {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub weight_grams: i32,
    pub bulk_price: Option<Decimal>,
    pub bulk_min_quantity: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionDto {
    pub id: Uuid,
    pub name: String,
    pub discount_type: String,
    pub amount: Decimal,
    pub start_at: chrono::DateTime<chrono::Utc>,
    pub end_at: chrono::DateTime<chrono::Utc>,
}

impl PromotionDto {
    pub fn is_active(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.start_at <= now && now <= self.end_at
    }

    pub fn discount(&self) -> Option<Discount> {
        DiscountType::parse(&self.discount_type).map(|kind| Discount {
            kind,
            amount: self.amount,
        })
    }
}

impl ProductDetailDto {
    pub fn from_domain(detail: ProductDetail, promotion: Option<Promotion>) -> Self {
        let ProductDetail {
            product,
            shop_name,
            shop_slug,
            category_name,
            skus,
            rating,
            review_count,
        } = detail;
        Self {
            id: product.id,
            shop_id: product.shop_id,
            shop_name,
            shop_slug,
            category_id: product.category_id,
            category_name,
            name: product.name,
            slug: product.slug,
            description: product.description,
            sold_count: product.sold_count,
            favorite_count: product.favorite_count,
            rating,
            review_count,
            skus: skus.into_iter().map(SkuDto::from).collect(),
            promotion: promotion.map(|p| PromotionDto {
                id: p.id,
                name: p.name,
                discount_type: p.discount_type.as_str().to_string(),
                amount: p.amount,
                start_at: p.start_at,
                end_at: p.end_at,
            }),
            created_at: product.created_at,
        }
    }

    /// Price of one unit of `sku` right now, promotion applied when active.
    pub fn promo_price(&self, sku: &SkuDto, now: chrono::DateTime<chrono::Utc>) -> Option<Decimal> {
        let discount = self
            .promotion
            .as_ref()
            .filter(|p| p.is_active(now))
            .and_then(|p| p.discount())?;
        Some(pricing::promoted_price(sku.price, Some(&discount)))
    }
}

impl From<Sku> for SkuDto {
    fn from(s: Sku) -> Self {
        Self {
            id: s.id,
            name: s.name,
            price: s.price,
            stock: s.stock,
            weight_grams: s.weight_grams,
            bulk_price: s.bulk_price,
            bulk_min_quantity: s.bulk_min_quantity,
        }
    }
}
