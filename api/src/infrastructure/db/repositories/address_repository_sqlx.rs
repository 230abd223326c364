use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::address_repository::AddressRepository;
use crate::domain::users::user::{Address, NewAddress};
use crate::infrastructure::db::PgPool;

pub struct SqlxAddressRepository {
    pub pool: PgPool,
}

impl SqlxAddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, user_id, label, recipient, phone, province_id, city_id, street, postal_code, is_default, created_at";

fn address_from_row(r: &PgRow) -> Address {
    Address {
        id: r.get("id"),
        user_id: r.get("user_id"),
        label: r.get("label"),
        recipient: r.get("recipient"),
        phone: r.get("phone"),
        province_id: r.get("province_id"),
        city_id: r.get("city_id"),
        street: r.get("street"),
        postal_code: r.get("postal_code"),
        is_default: r.get("is_default"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl AddressRepository for SqlxAddressRepository {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Address>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM addresses WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC",
            COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(address_from_row).collect())
    }

    async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Address>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM addresses WHERE id = $1 AND user_id = $2",
            COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(address_from_row))
    }

    async fn create(
        &self,
        user_id: Uuid,
        address: &NewAddress,
        max: i64,
    ) -> anyhow::Result<Option<Address>> {
        let mut tx = self.pool.begin().await?;
        // Serializes address writes of one user
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR NO KEY UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            anyhow::bail!("user {user_id} not found");
        }
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        if count >= max {
            return Ok(None);
        }
        let row = sqlx::query(&format!(
            r#"INSERT INTO addresses (user_id, label, recipient, phone, province_id, city_id, street, postal_code, is_default)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {}"#,
            COLUMNS
        ))
        .bind(user_id)
        .bind(&address.label)
        .bind(&address.recipient)
        .bind(&address.phone)
        .bind(address.province_id)
        .bind(address.city_id)
        .bind(&address.street)
        .bind(&address.postal_code)
        .bind(count == 0)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some(address_from_row(&row)))
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        address: &NewAddress,
    ) -> anyhow::Result<Option<Address>> {
        let row = sqlx::query(&format!(
            r#"UPDATE addresses SET label = $3, recipient = $4, phone = $5, province_id = $6,
                   city_id = $7, street = $8, postal_code = $9
               WHERE id = $1 AND user_id = $2
               RETURNING {}"#,
            COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&address.label)
        .bind(&address.recipient)
        .bind(&address.phone)
        .bind(address.province_id)
        .bind(address.city_id)
        .bind(&address.street)
        .bind(&address.postal_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(address_from_row))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_default(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM addresses WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if !owned {
            return Ok(false);
        }
        sqlx::query("UPDATE addresses SET is_default = false WHERE user_id = $1 AND is_default AND id <> $2")
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE addresses SET is_default = true WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}
