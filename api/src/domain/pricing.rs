//! Price arithmetic shared by carts, promotions, vouchers and checkout.
//!
//! All amounts are `Decimal` in the marketplace currency. Percent discounts are
//! expressed as whole percentages (`10` means 10%) and are rounded toward zero
//! at two decimal places, so a discount never exceeds the exact value.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountType {
    Percent,
    Nominal,
    /// Only meaningful for marketplace vouchers: discounts the shipping fee.
    Shipping,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percent => "percent",
            DiscountType::Nominal => "nominal",
            DiscountType::Shipping => "shipping",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "percent" => Some(DiscountType::Percent),
            "nominal" => Some(DiscountType::Nominal),
            "shipping" => Some(DiscountType::Shipping),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discount {
    pub kind: DiscountType,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkPrice {
    pub price: Decimal,
    pub min_quantity: i32,
}

/// Largest amount a stored money column (14 digits, 2 decimals) holds.
pub fn max_money() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// Positive, at most two decimals and storable.
pub fn is_storable_price(v: Decimal) -> bool {
    v > Decimal::ZERO && v.scale() <= 2 && v <= max_money()
}

pub fn round_money(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

fn percent_of(base: Decimal, percent: Decimal) -> Decimal {
    round_money(base * percent / Decimal::ONE_HUNDRED)
}

/// Validates the amount of a discount definition (promotion or voucher).
pub fn discount_amount_is_valid(discount: &Discount) -> bool {
    match discount.kind {
        DiscountType::Percent => discount.amount > Decimal::ZERO && discount.amount <= Decimal::ONE_HUNDRED,
        DiscountType::Nominal | DiscountType::Shipping => discount.amount > Decimal::ZERO,
    }
}

/// Unit price after a product promotion, floored at zero.
pub fn promoted_price(price: Decimal, promo: Option<&Discount>) -> Decimal {
    let discounted = match promo {
        None => price,
        Some(d) => match d.kind {
            DiscountType::Percent => price - percent_of(price, d.amount),
            DiscountType::Nominal => price - d.amount,
            DiscountType::Shipping => price,
        },
    };
    discounted.max(Decimal::ZERO)
}

/// Effective unit price for `quantity` units: the promoted price, or the bulk
/// price when the quantity qualifies and it is cheaper.
pub fn unit_price(
    price: Decimal,
    quantity: i32,
    promo: Option<&Discount>,
    bulk: Option<&BulkPrice>,
) -> Decimal {
    let promoted = promoted_price(price, promo);
    match bulk {
        Some(b) if b.min_quantity > 0 && quantity >= b.min_quantity => promoted.min(b.price),
        _ => promoted,
    }
}

/// Discount granted by a voucher over `goods` (merchandise) and `shipping`.
pub fn voucher_discount(
    discount: &Discount,
    max_discount: Option<Decimal>,
    goods: Decimal,
    shipping: Decimal,
) -> Decimal {
    let raw = match discount.kind {
        DiscountType::Percent => percent_of(goods, discount.amount),
        DiscountType::Nominal => discount.amount.min(goods),
        DiscountType::Shipping => discount.amount.min(shipping),
    };
    let capped = match max_discount {
        Some(cap) if cap > Decimal::ZERO => raw.min(cap),
        _ => raw,
    };
    capped.max(Decimal::ZERO)
}

/// Courier fee: base plus a per-kilogram fee, weight rounded up to whole kg
/// with a one kilogram minimum.
pub fn shipping_cost(base_fee: Decimal, per_kg_fee: Decimal, weight_grams: i64) -> Decimal {
    let kg = (weight_grams.max(1) + 999) / 1000;
    base_fee + per_kg_fee * Decimal::from(kg)
}

/// Splits `amount` across `weights` proportionally. The last slot absorbs the
/// rounding remainder so the parts always sum to `amount`.
pub fn allocate(amount: Decimal, weights: &[Decimal]) -> Vec<Decimal> {
    let total: Decimal = weights.iter().copied().sum();
    if weights.is_empty() {
        return Vec::new();
    }
    if total <= Decimal::ZERO || amount <= Decimal::ZERO {
        return vec![Decimal::ZERO; weights.len()];
    }
    let mut out = Vec::with_capacity(weights.len());
    let mut assigned = Decimal::ZERO;
    for (i, w) in weights.iter().enumerate() {
        if i + 1 == weights.len() {
            out.push(amount - assigned);
        } else {
            let share = round_money(amount * *w / total);
            assigned += share;
            out.push(share);
        }
    }
    out
}

/// A voucher is redeemable inside its validity window while quota remains.
pub fn voucher_is_redeemable(
    now: DateTime<Utc>,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    quota: i32,
) -> bool {
    quota > 0 && start_at <= now && now <= end_at
}
