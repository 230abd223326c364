use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::cart_repository::{CartLine, CartRepository};
use crate::infrastructure::db::PgPool;

pub struct SqlxCartRepository {
    pub pool: PgPool,
}

impl SqlxCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LINE_SELECT: &str = r#"
    SELECT ci.id AS cart_item_id, ci.user_id, ci.quantity,
           k.id AS sku_id, k.name AS sku_name, k.price, k.stock, k.weight_grams,
           k.bulk_price, k.bulk_min_quantity,
           p.id AS product_id, p.name AS product_name, p.slug AS product_slug, p.category_id,
           sh.id AS shop_id, sh.name AS shop_name
    FROM cart_items ci
    JOIN skus k ON k.id = ci.sku_id
    JOIN products p ON p.id = k.product_id
    JOIN shops sh ON sh.id = p.shop_id
"#;

fn line_from_row(r: &PgRow) -> CartLine {
    CartLine {
        cart_item_id: r.get("cart_item_id"),
        user_id: r.get("user_id"),
        quantity: r.get("quantity"),
        sku_id: r.get("sku_id"),
        sku_name: r.get("sku_name"),
        price: r.get("price"),
        stock: r.get("stock"),
        weight_grams: r.get("weight_grams"),
        bulk_price: r.get("bulk_price"),
        bulk_min_quantity: r.get("bulk_min_quantity"),
        product_id: r.get("product_id"),
        product_name: r.get("product_name"),
        product_slug: r.get("product_slug"),
        category_id: r.get("category_id"),
        shop_id: r.get("shop_id"),
        shop_name: r.get("shop_name"),
    }
}

#[async_trait]
impl CartRepository for SqlxCartRepository {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<CartLine>> {
        let rows = sqlx::query(&format!(
            "{} WHERE ci.user_id = $1 AND NOT p.is_archived ORDER BY sh.name, ci.created_at",
            LINE_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(line_from_row).collect())
    }

    async fn get_line(&self, user_id: Uuid, cart_item_id: Uuid) -> anyhow::Result<Option<CartLine>> {
        let row = sqlx::query(&format!(
            "{} WHERE ci.id = $1 AND ci.user_id = $2",
            LINE_SELECT
        ))
        .bind(cart_item_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(line_from_row))
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        sku_id: Uuid,
        quantity: i32,
    ) -> anyhow::Result<Option<(Uuid, i32)>> {
        let row = sqlx::query(
            r#"INSERT INTO cart_items (user_id, sku_id, quantity)
               SELECT $1, s.id, $3 FROM skus s WHERE s.id = $2 AND s.stock >= $3
               ON CONFLICT (user_id, sku_id) DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
               WHERE cart_items.quantity::BIGINT + EXCLUDED.quantity
                     <= (SELECT stock FROM skus WHERE id = EXCLUDED.sku_id)
               RETURNING id, quantity"#,
        )
        .bind(user_id)
        .bind(sku_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| (r.get("id"), r.get("quantity"))))
    }

    async fn quantity_for_sku(&self, user_id: Uuid, sku_id: Uuid) -> anyhow::Result<i32> {
        let qty: Option<i32> = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE user_id = $1 AND sku_id = $2",
        )
        .bind(user_id)
        .bind(sku_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(qty.unwrap_or(0))
    }

    async fn update_quantity(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE cart_items SET quantity = $3 WHERE id = $1 AND user_id = $2")
            .bind(cart_item_id)
            .bind(user_id)
            .bind(quantity)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, user_id: Uuid, cart_item_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(cart_item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
