use uuid::Uuid;

use crate::application::ports::shop_repository::ShopRepository;
use crate::application::ports::voucher_repository::VoucherRepository;
use crate::application::use_cases::shops::get_shop::require_own_shop;
use crate::application::use_cases::shops::{ShopError, validate_voucher};
use crate::domain::shops::voucher::{NewVoucher, ShopVoucher};

pub struct CreateShopVoucher<'a, S, V>
where
    S: ShopRepository + ?Sized,
    V: VoucherRepository + ?Sized,
{
    pub shops: &'a S,
    pub vouchers: &'a V,
}

impl<'a, S, V> CreateShopVoucher<'a, S, V>
where
    S: ShopRepository + ?Sized,
    V: VoucherRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, input: NewVoucher) -> Result<ShopVoucher, ShopError> {
        let shop = require_own_shop(self.shops, user_id).await?;
        let input = validate_voucher(input, false).map_err(ShopError::InvalidInput)?;
        if self.vouchers.shop_code_exists(shop.id, &input.code).await? {
            return Err(ShopError::CodeTaken);
        }
        Ok(self.vouchers.create_shop_voucher(shop.id, &input).await?)
    }
}

pub struct ManageShopVouchers<'a, S, V>
where
    S: ShopRepository + ?Sized,
    V: VoucherRepository + ?Sized,
{
    pub shops: &'a S,
    pub vouchers: &'a V,
}

impl<'a, S, V> ManageShopVouchers<'a, S, V>
where
    S: ShopRepository + ?Sized,
    V: VoucherRepository + ?Sized,
{
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<ShopVoucher>, ShopError> {
        let shop = require_own_shop(self.shops, user_id).await?;
        Ok(self.vouchers.list_shop_vouchers(shop.id).await?)
    }

    pub async fn delete(&self, user_id: Uuid, voucher_id: Uuid) -> Result<(), ShopError> {
        let shop = require_own_shop(self.shops, user_id).await?;
        if !self.vouchers.delete_shop_voucher(shop.id, voucher_id).await? {
            return Err(ShopError::VoucherNotFound);
        }
        Ok(())
    }

    /// Redeemable vouchers of a public shop page.
    pub async fn list_active(&self, shop_slug: &str) -> Result<Vec<ShopVoucher>, ShopError> {
        let shop = self
            .shops
            .get_by_slug(shop_slug)
            .await?
            .ok_or(ShopError::NotFound)?;
        Ok(self
            .vouchers
            .list_active_shop_vouchers(shop.id, chrono::Utc::now())
            .await?)
    }
}
