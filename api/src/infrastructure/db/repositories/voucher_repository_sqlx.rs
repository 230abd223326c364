use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::voucher_repository::VoucherRepository;
use crate::domain::marketplace::voucher::MarketplaceVoucher;
use crate::domain::pricing::DiscountType;
use crate::domain::shops::voucher::{NewVoucher, ShopVoucher};
use crate::infrastructure::db::PgPool;

pub struct SqlxVoucherRepository {
    pub pool: PgPool,
}

impl SqlxVoucherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SHOP_COLUMNS: &str =
    "id, shop_id, code, name, discount_type, amount, min_spending, quota, start_at, end_at";
const MARKETPLACE_COLUMNS: &str = "id, code, name, category_id, discount_type, amount, max_discount, min_spending, quota, start_at, end_at";

fn discount_type(r: &PgRow) -> anyhow::Result<DiscountType> {
    let kind: String = r.get("discount_type");
    DiscountType::parse(&kind).ok_or_else(|| anyhow::anyhow!("unknown discount type {}", kind))
}

fn shop_voucher_from_row(r: &PgRow) -> anyhow::Result<ShopVoucher> {
    Ok(ShopVoucher {
        id: r.get("id"),
        shop_id: r.get("shop_id"),
        code: r.get("code"),
        name: r.get("name"),
        discount_type: discount_type(r)?,
        amount: r.get("amount"),
        min_spending: r.get("min_spending"),
        quota: r.get("quota"),
        start_at: r.get("start_at"),
        end_at: r.get("end_at"),
    })
}

fn marketplace_voucher_from_row(r: &PgRow) -> anyhow::Result<MarketplaceVoucher> {
    Ok(MarketplaceVoucher {
        id: r.get("id"),
        code: r.get("code"),
        name: r.get("name"),
        category_id: r.get("category_id"),
        discount_type: discount_type(r)?,
        amount: r.get("amount"),
        max_discount: r.get("max_discount"),
        min_spending: r.get("min_spending"),
        quota: r.get("quota"),
        start_at: r.get("start_at"),
        end_at: r.get("end_at"),
    })
}

#[async_trait]
impl VoucherRepository for SqlxVoucherRepository {
    async fn create_shop_voucher(
        &self,
        shop_id: Uuid,
        voucher: &NewVoucher,
    ) -> anyhow::Result<ShopVoucher> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO shop_vouchers (shop_id, code, name, discount_type, amount, min_spending, quota, start_at, end_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}"#,
            SHOP_COLUMNS
        ))
        .bind(shop_id)
        .bind(&voucher.code)
        .bind(&voucher.name)
        .bind(voucher.discount_type.as_str())
        .bind(voucher.amount)
        .bind(voucher.min_spending)
        .bind(voucher.quota)
        .bind(voucher.start_at)
        .bind(voucher.end_at)
        .fetch_one(&self.pool)
        .await?;
        shop_voucher_from_row(&row)
    }

    async fn shop_code_exists(&self, shop_id: Uuid, code: &str) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM shop_vouchers WHERE shop_id = $1 AND code = $2 AND deleted_at IS NULL)",
        )
        .bind(shop_id)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list_shop_vouchers(&self, shop_id: Uuid) -> anyhow::Result<Vec<ShopVoucher>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM shop_vouchers WHERE shop_id = $1 AND deleted_at IS NULL ORDER BY start_at DESC",
            SHOP_COLUMNS
        ))
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(shop_voucher_from_row).collect()
    }

    async fn list_active_shop_vouchers(
        &self,
        shop_id: Uuid,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<Vec<ShopVoucher>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM shop_vouchers
               WHERE shop_id = $1 AND deleted_at IS NULL AND quota > 0
                 AND start_at <= $2 AND end_at >= $2
               ORDER BY end_at"#,
            SHOP_COLUMNS
        ))
        .bind(shop_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(shop_voucher_from_row).collect()
    }

    async fn delete_shop_voucher(&self, shop_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE shop_vouchers SET deleted_at = now() WHERE id = $1 AND shop_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(shop_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_shop_voucher(
        &self,
        shop_id: Uuid,
        code: &str,
    ) -> anyhow::Result<Option<ShopVoucher>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM shop_vouchers WHERE shop_id = $1 AND code = $2 AND deleted_at IS NULL",
            SHOP_COLUMNS
        ))
        .bind(shop_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(shop_voucher_from_row).transpose()
    }

    async fn create_marketplace_voucher(
        &self,
        voucher: &NewVoucher,
    ) -> anyhow::Result<MarketplaceVoucher> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO marketplace_vouchers (code, name, category_id, discount_type, amount, max_discount, min_spending, quota, start_at, end_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}"#,
            MARKETPLACE_COLUMNS
        ))
        .bind(&voucher.code)
        .bind(&voucher.name)
        .bind(voucher.category_id)
        .bind(voucher.discount_type.as_str())
        .bind(voucher.amount)
        .bind(voucher.max_discount)
        .bind(voucher.min_spending)
        .bind(voucher.quota)
        .bind(voucher.start_at)
        .bind(voucher.end_at)
        .fetch_one(&self.pool)
        .await?;
        marketplace_voucher_from_row(&row)
    }

    async fn marketplace_code_exists(&self, code: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM marketplace_vouchers WHERE code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn list_active_marketplace_vouchers(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<Vec<MarketplaceVoucher>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM marketplace_vouchers
               WHERE quota > 0 AND start_at <= $1 AND end_at >= $1
               ORDER BY end_at"#,
            MARKETPLACE_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(marketplace_voucher_from_row).collect()
    }

    async fn find_marketplace_voucher(
        &self,
        code: &str,
    ) -> anyhow::Result<Option<MarketplaceVoucher>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM marketplace_vouchers WHERE code = $1",
            MARKETPLACE_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(marketplace_voucher_from_row).transpose()
    }
}
