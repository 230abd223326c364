use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::pricing::{self, Discount, DiscountType};

/// Platform-wide voucher. A `category_id` restricts it to carts whose
/// products all belong to that category.
#[derive(Debug, Clone)]
pub struct MarketplaceVoucher {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub category_id: Option<i32>,
    pub discount_type: DiscountType,
    pub amount: Decimal,
    pub max_discount: Option<Decimal>,
    pub min_spending: Decimal,
    pub quota: i32,
    pub start_at: chrono::DateTime<chrono::Utc>,
    pub end_at: chrono::DateTime<chrono::Utc>,
}

impl MarketplaceVoucher {
    pub fn discount(&self) -> Discount {
        Discount {
            kind: self.discount_type,
            amount: self.amount,
        }
    }

    pub fn is_redeemable(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        pricing::voucher_is_redeemable(now, self.start_at, self.end_at, self.quota)
    }

    pub fn allows_category(&self, category_id: i32) -> bool {
        self.category_id.map(|c| c == category_id).unwrap_or(true)
    }
}
