use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::voucher_repository::VoucherRepository;
use crate::application::use_cases::marketplace::MarketplaceError;
use crate::application::use_cases::shops::validate_voucher;
use crate::domain::marketplace::voucher::MarketplaceVoucher;
use crate::domain::shops::voucher::NewVoucher;

pub struct CreateMarketplaceVoucher<'a, V, P>
where
    V: VoucherRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub vouchers: &'a V,
    pub products: &'a P,
}

impl<'a, V, P> CreateMarketplaceVoucher<'a, V, P>
where
    V: VoucherRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub async fn execute(&self, input: NewVoucher) -> Result<MarketplaceVoucher, MarketplaceError> {
        let input = validate_voucher(input, true).map_err(MarketplaceError::InvalidInput)?;
        if let Some(category_id) = input.category_id {
            if !self.products.category_exists(category_id).await? {
                return Err(MarketplaceError::CategoryNotFound);
            }
        }
        if self.vouchers.marketplace_code_exists(&input.code).await? {
            return Err(MarketplaceError::CodeTaken);
        }
        let voucher = self.vouchers.create_marketplace_voucher(&input).await?;
        tracing::info!(voucher_id = %voucher.id, code = %voucher.code, "marketplace_voucher_created");
        Ok(voucher)
    }
}

pub struct ListMarketplaceVouchers<'a, V: VoucherRepository + ?Sized> {
    pub vouchers: &'a V,
}

impl<'a, V: VoucherRepository + ?Sized> ListMarketplaceVouchers<'a, V> {
    pub async fn execute(&self) -> anyhow::Result<Vec<MarketplaceVoucher>> {
        self.vouchers
            .list_active_marketplace_vouchers(chrono::Utc::now())
            .await
    }
}
