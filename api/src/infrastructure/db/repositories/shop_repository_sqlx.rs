use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use super::location_repository_sqlx::courier_from_row;
use crate::application::ports::shop_repository::ShopRepository;
use crate::domain::locations::location::Courier;
use crate::domain::shops::shop::Shop;
use crate::infrastructure::db::PgPool;

pub struct SqlxShopRepository {
    pub pool: PgPool,
}

impl SqlxShopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, user_id, name, slug, description, address_id, created_at";

fn shop_from_row(r: &PgRow) -> Shop {
    Shop {
        id: r.get("id"),
        user_id: r.get("user_id"),
        name: r.get("name"),
        slug: r.get("slug"),
        description: r.get("description"),
        address_id: r.get("address_id"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl ShopRepository for SqlxShopRepository {
    async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        slug: &str,
        description: &str,
        address_id: Uuid,
    ) -> anyhow::Result<Shop> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO shops (user_id, name, slug, description, address_id)
               VALUES ($1, $2, $3, $4, $5) RETURNING {}"#,
            COLUMNS
        ))
        .bind(user_id)
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(address_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(shop_from_row(&row))
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Shop>> {
        let row = sqlx::query(&format!("SELECT {} FROM shops WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(shop_from_row))
    }

    async fn get_by_slug(&self, slug: &str) -> anyhow::Result<Option<Shop>> {
        let row = sqlx::query(&format!("SELECT {} FROM shops WHERE slug = $1", COLUMNS))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(shop_from_row))
    }

    async fn get_by_owner(&self, user_id: Uuid) -> anyhow::Result<Option<Shop>> {
        let row = sqlx::query(&format!("SELECT {} FROM shops WHERE user_id = $1", COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(shop_from_row))
    }

    async fn name_exists(&self, name: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shops WHERE lower(name) = lower($1))")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn slug_exists(&self, slug: &str) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shops WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn update(
        &self,
        shop_id: Uuid,
        description: Option<String>,
        address_id: Option<Uuid>,
    ) -> anyhow::Result<Shop> {
        let row = sqlx::query(&format!(
            r#"UPDATE shops SET description = COALESCE($2, description),
                   address_id = COALESCE($3, address_id)
               WHERE id = $1 RETURNING {}"#,
            COLUMNS
        ))
        .bind(shop_id)
        .bind(description)
        .bind(address_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(shop_from_row(&row))
    }

    async fn set_couriers(&self, shop_id: Uuid, courier_ids: &[i32]) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let known: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM couriers WHERE id = ANY($1)")
            .bind(courier_ids)
            .fetch_one(&mut *tx)
            .await?;
        if known != courier_ids.len() as i64 {
            return Ok(false);
        }
        sqlx::query("DELETE FROM shop_couriers WHERE shop_id = $1")
            .bind(shop_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO shop_couriers (shop_id, courier_id) SELECT $1, UNNEST($2::int4[])",
        )
        .bind(shop_id)
        .bind(courier_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn list_couriers(&self, shop_id: Uuid) -> anyhow::Result<Vec<Courier>> {
        let rows = sqlx::query(
            r#"SELECT c.id, c.code, c.name, c.base_fee, c.per_kg_fee
               FROM couriers c JOIN shop_couriers sc ON sc.courier_id = c.id
               WHERE sc.shop_id = $1 ORDER BY c.id"#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(courier_from_row).collect())
    }

    async fn find_courier(
        &self,
        shop_id: Uuid,
        courier_id: i32,
    ) -> anyhow::Result<Option<Courier>> {
        let row = sqlx::query(
            r#"SELECT c.id, c.code, c.name, c.base_fee, c.per_kg_fee
               FROM couriers c JOIN shop_couriers sc ON sc.courier_id = c.id
               WHERE sc.shop_id = $1 AND c.id = $2"#,
        )
        .bind(shop_id)
        .bind(courier_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(courier_from_row))
    }
}
