use async_trait::async_trait;
use sqlx::Row;

use crate::application::ports::location_repository::LocationRepository;
use crate::domain::locations::location::{City, Courier, Province};
use crate::infrastructure::db::PgPool;

pub struct SqlxLocationRepository {
    pub pool: PgPool,
}

impl SqlxLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for SqlxLocationRepository {
    async fn list_provinces(&self) -> anyhow::Result<Vec<Province>> {
        let rows = sqlx::query("SELECT id, name FROM provinces ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| Province {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn list_cities(&self, province_id: i32) -> anyhow::Result<Vec<City>> {
        let rows =
            sqlx::query("SELECT id, province_id, name FROM cities WHERE province_id = $1 ORDER BY name")
                .bind(province_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|r| City {
                id: r.get("id"),
                province_id: r.get("province_id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn get_city(&self, city_id: i32) -> anyhow::Result<Option<City>> {
        let row = sqlx::query("SELECT id, province_id, name FROM cities WHERE id = $1")
            .bind(city_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| City {
            id: r.get("id"),
            province_id: r.get("province_id"),
            name: r.get("name"),
        }))
    }

    async fn list_couriers(&self) -> anyhow::Result<Vec<Courier>> {
        let rows = sqlx::query("SELECT id, code, name, base_fee, per_kg_fee FROM couriers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(courier_from_row).collect())
    }
}

pub(crate) fn courier_from_row(r: &sqlx::postgres::PgRow) -> Courier {
    Courier {
        id: r.get("id"),
        code: r.get("code"),
        name: r.get("name"),
        base_fee: r.get("base_fee"),
        per_kg_fee: r.get("per_kg_fee"),
    }
}
