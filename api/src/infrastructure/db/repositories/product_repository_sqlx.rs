use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::product_repository::ProductRepository;
use crate::domain::pagination::PageRequest;
use crate::domain::pricing::DiscountType;
use crate::domain::products::product::{
    Category, NewProduct, NewPromotion, Product, ProductDetail, ProductQuery, ProductSort,
    ProductSummary, ProductUpdate, Promotion, Review, Sku, SkuRef, SkuUpdate,
};
use crate::infrastructure::db::PgPool;

pub struct SqlxProductRepository {
    pub pool: PgPool,
}

impl SqlxProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn skus_of(&self, product_id: Uuid) -> anyhow::Result<Vec<Sku>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM skus WHERE product_id = $1 ORDER BY price, name",
            SKU_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(sku_from_row).collect())
    }
}

const PRODUCT_COLUMNS: &str = "p.id, p.shop_id, p.category_id, p.name, p.slug, p.description, p.is_archived, p.sold_count, p.favorite_count, p.created_at";
const SKU_COLUMNS: &str =
    "id, product_id, name, price, stock, weight_grams, bulk_price, bulk_min_quantity";
const PROMOTION_COLUMNS: &str =
    "id, shop_id, product_id, name, discount_type, amount, start_at, end_at";

// Non-archived products with their price range and rating; $1 text, $2 category,
// $3 shop, $4/$5 price range on the cheapest SKU
const SEARCH_CTE: &str = r#"
    WITH s AS (
        SELECT p.id, p.name, p.slug, p.shop_id, sh.name AS shop_name, p.sold_count, p.created_at,
               MIN(k.price) AS min_price, MAX(k.price) AS max_price,
               (SELECT AVG(r.rating)::float8 FROM transaction_reviews r WHERE r.product_id = p.id) AS rating
        FROM products p
        JOIN shops sh ON sh.id = p.shop_id
        JOIN skus k ON k.product_id = p.id
        WHERE NOT p.is_archived
          AND ($1::text IS NULL OR p.name ILIKE '%' || $1 || '%')
          AND ($2::int4 IS NULL OR p.category_id = $2)
          AND ($3::uuid IS NULL OR p.shop_id = $3)
        GROUP BY p.id, sh.name
    )
    "#;
const SEARCH_FILTER: &str =
    "($4::numeric IS NULL OR min_price >= $4) AND ($5::numeric IS NULL OR min_price <= $5)";

fn order_by(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::Newest => "created_at DESC",
        ProductSort::PriceAsc => "min_price ASC, created_at DESC",
        ProductSort::PriceDesc => "min_price DESC, created_at DESC",
        ProductSort::BestSelling => "sold_count DESC, created_at DESC",
    }
}

fn product_from_row(r: &PgRow) -> Product {
    Product {
        id: r.get("id"),
        shop_id: r.get("shop_id"),
        category_id: r.get("category_id"),
        name: r.get("name"),
        slug: r.get("slug"),
        description: r.get("description"),
        is_archived: r.get("is_archived"),
        sold_count: r.get("sold_count"),
        favorite_count: r.get("favorite_count"),
        created_at: r.get("created_at"),
    }
}

fn sku_from_row(r: &PgRow) -> Sku {
    Sku {
        id: r.get("id"),
        product_id: r.get("product_id"),
        name: r.get("name"),
        price: r.get("price"),
        stock: r.get("stock"),
        weight_grams: r.get("weight_grams"),
        bulk_price: r.get("bulk_price"),
        bulk_min_quantity: r.get("bulk_min_quantity"),
    }
}

fn summary_from_row(r: &PgRow) -> ProductSummary {
    ProductSummary {
        id: r.get("id"),
        name: r.get("name"),
        slug: r.get("slug"),
        shop_id: r.get("shop_id"),
        shop_name: r.get("shop_name"),
        min_price: r.get("min_price"),
        max_price: r.get("max_price"),
        sold_count: r.get("sold_count"),
        rating: r.get("rating"),
    }
}

pub(crate) fn promotion_from_row(r: &PgRow) -> anyhow::Result<Promotion> {
    let kind: String = r.get("discount_type");
    Ok(Promotion {
        id: r.get("id"),
        shop_id: r.get("shop_id"),
        product_id: r.get("product_id"),
        name: r.get("name"),
        discount_type: DiscountType::parse(&kind)
            .ok_or_else(|| anyhow::anyhow!("unknown discount type {}", kind))?,
        amount: r.get("amount"),
        start_at: r.get("start_at"),
        end_at: r.get("end_at"),
    })
}

#[async_trait]
impl ProductRepository for SqlxProductRepository {
    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, slug, parent_id FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: r.get("id"),
                name: r.get("name"),
                slug: r.get("slug"),
                parent_id: r.get("parent_id"),
            })
            .collect())
    }

    async fn category_exists(&self, id: i32) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn slug_exists(&self, slug: &str) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create_product(
        &self,
        shop_id: Uuid,
        product: &NewProduct,
    ) -> anyhow::Result<ProductDetail> {
        let mut tx = self.pool.begin().await?;
        let product_id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO products (shop_id, category_id, name, slug, description)
               VALUES ($1, $2, $3, $4, $5) RETURNING id"#,
        )
        .bind(shop_id)
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .fetch_one(&mut *tx)
        .await?;
        for sku in &product.skus {
            sqlx::query(
                r#"INSERT INTO skus (product_id, name, price, stock, weight_grams, bulk_price, bulk_min_quantity)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            )
            .bind(product_id)
            .bind(&sku.name)
            .bind(sku.price)
            .bind(sku.stock)
            .bind(sku.weight_grams)
            .bind(sku.bulk_price)
            .bind(sku.bulk_min_quantity)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        self.get_detail_by_slug(&product.slug)
            .await?
            .ok_or_else(|| anyhow::anyhow!("product {} vanished after insert", product_id))
    }

    async fn update_product(
        &self,
        shop_id: Uuid,
        product_id: Uuid,
        update: &ProductUpdate,
    ) -> anyhow::Result<Option<Product>> {
        let row = sqlx::query(&format!(
            r#"UPDATE products p SET name = COALESCE($3, p.name),
                   description = COALESCE($4, p.description),
                   is_archived = COALESCE($5, p.is_archived)
               WHERE p.id = $1 AND p.shop_id = $2
               RETURNING {}"#,
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(shop_id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.is_archived)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(product_from_row))
    }

    async fn update_sku(
        &self,
        shop_id: Uuid,
        sku_id: Uuid,
        update: &SkuUpdate,
    ) -> anyhow::Result<Option<(Sku, String)>> {
        let row = sqlx::query(
            r#"UPDATE skus k SET price = COALESCE($3, k.price), stock = COALESCE($4, k.stock)
               FROM products p
               WHERE k.id = $1 AND p.id = k.product_id AND p.shop_id = $2
               RETURNING k.id, k.product_id, k.name, k.price, k.stock, k.weight_grams,
                         k.bulk_price, k.bulk_min_quantity, p.slug AS product_slug"#,
        )
        .bind(sku_id)
        .bind(shop_id)
        .bind(update.price)
        .bind(update.stock)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| (sku_from_row(&r), r.get("product_slug"))))
    }

    async fn get_owned(&self, shop_id: Uuid, product_id: Uuid) -> anyhow::Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM products p WHERE p.id = $1 AND p.shop_id = $2",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(shop_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(product_from_row))
    }

    async fn search(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ProductSummary>, i64)> {
        let total: i64 = sqlx::query_scalar(&format!(
            "{} SELECT COUNT(*) FROM s WHERE {}",
            SEARCH_CTE, SEARCH_FILTER
        ))
        .bind(&query.q)
        .bind(query.category_id)
        .bind(query.shop_id)
        .bind(query.min_price)
        .bind(query.max_price)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query(&format!(
            "{} SELECT * FROM s WHERE {} ORDER BY {} LIMIT $6 OFFSET $7",
            SEARCH_CTE,
            SEARCH_FILTER,
            order_by(query.sort)
        ))
        .bind(&query.q)
        .bind(query.category_id)
        .bind(query.shop_id)
        .bind(query.min_price)
        .bind(query.max_price)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok((rows.iter().map(summary_from_row).collect(), total))
    }

    async fn get_detail_by_slug(&self, slug: &str) -> anyhow::Result<Option<ProductDetail>> {
        let row = sqlx::query(&format!(
            r#"SELECT {}, sh.name AS shop_name, sh.slug AS shop_slug, c.name AS category_name,
                      (SELECT AVG(r.rating)::float8 FROM transaction_reviews r WHERE r.product_id = p.id) AS rating,
                      (SELECT COUNT(*) FROM transaction_reviews r WHERE r.product_id = p.id) AS review_count
               FROM products p
               JOIN shops sh ON sh.id = p.shop_id
               JOIN categories c ON c.id = p.category_id
               WHERE p.slug = $1"#,
            PRODUCT_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        let Some(r) = row else {
            return Ok(None);
        };
        let product = product_from_row(&r);
        let skus = self.skus_of(product.id).await?;
        Ok(Some(ProductDetail {
            product,
            shop_name: r.get("shop_name"),
            shop_slug: r.get("shop_slug"),
            category_name: r.get("category_name"),
            skus,
            rating: r.get("rating"),
            review_count: r.get("review_count"),
        }))
    }

    async fn find_sku(&self, sku_id: Uuid) -> anyhow::Result<Option<SkuRef>> {
        let row = sqlx::query(
            r#"SELECT k.id, k.product_id, k.stock, p.shop_id, p.is_archived
               FROM skus k JOIN products p ON p.id = k.product_id
               WHERE k.id = $1"#,
        )
        .bind(sku_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| SkuRef {
            sku_id: r.get("id"),
            product_id: r.get("product_id"),
            shop_id: r.get("shop_id"),
            stock: r.get("stock"),
            is_archived: r.get("is_archived"),
        }))
    }

    async fn active_promotion(
        &self,
        product_id: Uuid,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<Option<Promotion>> {
        let row = sqlx::query(&format!(
            r#"SELECT {} FROM promotions
               WHERE product_id = $1 AND start_at <= $2 AND end_at >= $2
               ORDER BY start_at DESC LIMIT 1"#,
            PROMOTION_COLUMNS
        ))
        .bind(product_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(promotion_from_row).transpose()
    }

    async fn create_promotion(
        &self,
        shop_id: Uuid,
        promotion: &NewPromotion,
    ) -> anyhow::Result<Promotion> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO promotions (shop_id, product_id, name, discount_type, amount, start_at, end_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}"#,
            PROMOTION_COLUMNS
        ))
        .bind(shop_id)
        .bind(promotion.product_id)
        .bind(&promotion.name)
        .bind(promotion.discount_type.as_str())
        .bind(promotion.amount)
        .bind(promotion.start_at)
        .bind(promotion.end_at)
        .fetch_one(&self.pool)
        .await?;
        promotion_from_row(&row)
    }

    async fn list_promotions(&self, shop_id: Uuid) -> anyhow::Result<Vec<Promotion>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM promotions WHERE shop_id = $1 ORDER BY start_at DESC",
            PROMOTION_COLUMNS
        ))
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(promotion_from_row).collect()
    }

    async fn list_reviews(
        &self,
        product_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<Review>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transaction_reviews WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;
        let rows = sqlx::query(
            r#"SELECT r.id, r.transaction_id, r.product_id, r.user_id, u.username, r.rating, r.comment, r.created_at
               FROM transaction_reviews r JOIN users u ON u.id = r.user_id
               WHERE r.product_id = $1
               ORDER BY r.created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(product_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let items = rows
            .into_iter()
            .map(|r| Review {
                id: r.get("id"),
                transaction_id: r.get("transaction_id"),
                product_id: r.get("product_id"),
                user_id: r.get("user_id"),
                username: r.get("username"),
                rating: r.get("rating"),
                comment: r.get("comment"),
                created_at: r.get("created_at"),
            })
            .collect();
        Ok((items, total))
    }

    async fn toggle_favorite(&self, user_id: Uuid, product_id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;
        if removed {
            sqlx::query(
                "UPDATE products SET favorite_count = GREATEST(favorite_count - 1, 0) WHERE id = $1",
            )
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query("INSERT INTO favorites (user_id, product_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE products SET favorite_count = favorite_count + 1 WHERE id = $1")
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(!removed)
    }

    async fn list_favorites(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ProductSummary>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(
            r#"SELECT p.id, p.name, p.slug, p.shop_id, sh.name AS shop_name, p.sold_count,
                      MIN(k.price) AS min_price, MAX(k.price) AS max_price,
                      (SELECT AVG(r.rating)::float8 FROM transaction_reviews r WHERE r.product_id = p.id) AS rating
               FROM favorites f
               JOIN products p ON p.id = f.product_id
               JOIN shops sh ON sh.id = p.shop_id
               JOIN skus k ON k.product_id = p.id
               WHERE f.user_id = $1
               GROUP BY p.id, sh.name, f.created_at
               ORDER BY f.created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok((rows.iter().map(summary_from_row).collect(), total))
    }

    async fn product_exists(&self, product_id: Uuid) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1 AND NOT is_archived)",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
