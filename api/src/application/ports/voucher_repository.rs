use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::marketplace::voucher::MarketplaceVoucher;
use crate::domain::shops::voucher::{NewVoucher, ShopVoucher};

#[async_trait]
pub trait VoucherRepository: Send + Sync {
    async fn create_shop_voucher(
        &self,
        shop_id: Uuid,
        voucher: &NewVoucher,
    ) -> anyhow::Result<ShopVoucher>;
    async fn shop_code_exists(&self, shop_id: Uuid, code: &str) -> anyhow::Result<bool>;
    async fn list_shop_vouchers(&self, shop_id: Uuid) -> anyhow::Result<Vec<ShopVoucher>>;
    async fn list_active_shop_vouchers(
        &self,
        shop_id: Uuid,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<Vec<ShopVoucher>>;
    // Soft delete
    async fn delete_shop_voucher(&self, shop_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
    async fn find_shop_voucher(
        &self,
        shop_id: Uuid,
        code: &str,
    ) -> anyhow::Result<Option<ShopVoucher>>;

    async fn create_marketplace_voucher(
        &self,
        voucher: &NewVoucher,
    ) -> anyhow::Result<MarketplaceVoucher>;
    async fn marketplace_code_exists(&self, code: &str) -> anyhow::Result<bool>;
    async fn list_active_marketplace_vouchers(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<Vec<MarketplaceVoucher>>;
    async fn find_marketplace_voucher(
        &self,
        code: &str,
    ) -> anyhow::Result<Option<MarketplaceVoucher>>;
}
