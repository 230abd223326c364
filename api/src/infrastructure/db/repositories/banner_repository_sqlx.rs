use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::application::ports::banner_repository::BannerRepository;
use crate::domain::marketplace::banner::{Banner, NewBanner};
use crate::infrastructure::db::PgPool;

pub struct SqlxBannerRepository {
    pub pool: PgPool,
}

impl SqlxBannerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn banner_from_row(r: &PgRow) -> Banner {
    Banner {
        id: r.get("id"),
        title: r.get("title"),
        image_url: r.get("image_url"),
        link_url: r.get("link_url"),
        start_at: r.get("start_at"),
        end_at: r.get("end_at"),
    }
}

#[async_trait]
impl BannerRepository for SqlxBannerRepository {
    async fn create(&self, banner: &NewBanner) -> anyhow::Result<Banner> {
        let row = sqlx::query(
            r#"INSERT INTO banners (title, image_url, link_url, start_at, end_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, title, image_url, link_url, start_at, end_at"#,
        )
        .bind(&banner.title)
        .bind(&banner.image_url)
        .bind(&banner.link_url)
        .bind(banner.start_at)
        .bind(banner.end_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(banner_from_row(&row))
    }

    async fn list_active(&self, now: chrono::DateTime<chrono::Utc>) -> anyhow::Result<Vec<Banner>> {
        let rows = sqlx::query(
            r#"SELECT id, title, image_url, link_url, start_at, end_at FROM banners
               WHERE start_at <= $1 AND end_at >= $1
               ORDER BY start_at DESC"#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(banner_from_row).collect())
    }
}
