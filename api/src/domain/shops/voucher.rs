use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::pricing::{self, Discount, DiscountType};

#[derive(Debug, Clone)]
pub struct ShopVoucher {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub code: String,
    pub name: String,
    pub discount_type: DiscountType,
    pub amount: Decimal,
    pub min_spending: Decimal,
    pub quota: i32,
    pub start_at: chrono::DateTime<chrono::Utc>,
    pub end_at: chrono::DateTime<chrono::Utc>,
}

impl ShopVoucher {
    pub fn discount(&self) -> Discount {
        Discount {
            kind: self.discount_type,
            amount: self.amount,
        }
    }

    pub fn is_redeemable(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        pricing::voucher_is_redeemable(now, self.start_at, self.end_at, self.quota)
    }
}

#[derive(Debug, Clone)]
pub struct NewVoucher {
    pub code: String,
    pub name: String,
    pub discount_type: DiscountType,
    pub amount: Decimal,
    pub max_discount: Option<Decimal>,
    pub category_id: Option<i32>,
    pub min_spending: Decimal,
    pub quota: i32,
    pub start_at: chrono::DateTime<chrono::Utc>,
    pub end_at: chrono::DateTime<chrono::Utc>,
}

/// Voucher codes are compared case-insensitively and stored uppercase.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
