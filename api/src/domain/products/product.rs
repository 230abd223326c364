use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::pricing::{BulkPrice, Discount, DiscountType};

#[derive(Debug, Clone)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub category_id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_archived: bool,
    pub sold_count: i32,
    pub favorite_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct Sku {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub weight_grams: i32,
    pub bulk_price: Option<Decimal>,
    pub bulk_min_quantity: Option<i32>,
}

impl Sku {
    pub fn bulk(&self) -> Option<BulkPrice> {
        match (self.bulk_price, self.bulk_min_quantity) {
            (Some(price), Some(min_quantity)) => Some(BulkPrice {
                price,
                min_quantity,
            }),
            _ => None,
        }
    }
}

/// Minimal view of a SKU used when adding to a cart.
#[derive(Debug, Clone)]
pub struct SkuRef {
    pub sku_id: Uuid,
    pub product_id: Uuid,
    pub shop_id: Uuid,
    pub stock: i32,
    pub is_archived: bool,
}

#[derive(Debug, Clone)]
pub struct NewSku {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub weight_grams: i32,
    pub bulk_price: Option<Decimal>,
    pub bulk_min_quantity: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub skus: Vec<NewSku>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct SkuUpdate {
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct ProductSummary {
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

#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub shop_name: String,
    pub shop_slug: String,
    pub category_name: String,
    pub skus: Vec<Sku>,
    pub rating: Option<f64>,
    pub review_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Newest,
    PriceAsc,
    PriceDesc,
    BestSelling,
}

impl ProductSort {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("price_asc") => ProductSort::PriceAsc,
            Some("price_desc") => ProductSort::PriceDesc,
            Some("best_selling") => ProductSort::BestSelling,
            _ => ProductSort::Newest,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category_id: Option<i32>,
    pub shop_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: ProductSort,
}

#[derive(Debug, Clone)]
pub struct Promotion {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub discount_type: DiscountType,
    pub amount: Decimal,
    pub start_at: chrono::DateTime<chrono::Utc>,
    pub end_at: chrono::DateTime<chrono::Utc>,
}

impl Promotion {
    pub fn discount(&self) -> Discount {
        Discount {
            kind: self.discount_type,
            amount: self.amount,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPromotion {
    pub product_id: Uuid,
    pub name: String,
    pub discount_type: DiscountType,
    pub amount: Decimal,
    pub start_at: chrono::DateTime<chrono::Utc>,
    pub end_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct Review {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
