use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::pricing::{self, Discount, DiscountType};
use crate::domain::shops::voucher::{self, NewVoucher};

pub mod couriers;
pub mod create_shop;
pub mod get_shop;
pub mod promotions;
pub mod update_shop;
pub mod vouchers;

#[derive(thiserror::Error, Debug)]
pub enum ShopError {
    #[error("shop not found")]
    NotFound,
    #[error("user already owns a shop")]
    AlreadyExists,
    #[error("shop name already taken")]
    NameTaken,
    #[error("address not found")]
    AddressNotFound,
    #[error("courier not found")]
    CourierNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("voucher not found")]
    VoucherNotFound,
    #[error("voucher code already used")]
    CodeTaken,
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

/// Validates the window and amounts of a discount definition shared by
/// promotions and vouchers.
pub(crate) fn validate_discount(
    discount: &Discount,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
) -> Result<(), String> {
    if !pricing::discount_amount_is_valid(discount) {
        return Err("discount amount out of range".into());
    }
    if end_at <= start_at {
        return Err("end_at must be after start_at".into());
    }
    if end_at <= Utc::now() {
        return Err("end_at must be in the future".into());
    }
    Ok(())
}

/// Normalizes and validates a voucher definition. Shop vouchers cannot
/// discount shipping or target a category; marketplace vouchers can.
pub(crate) fn validate_voucher(mut v: NewVoucher, marketplace: bool) -> Result<NewVoucher, String> {
    v.code = voucher::normalize_code(&v.code);
    v.name = v.name.trim().to_string();
    if v.code.len() < 3
        || v.code.len() > 20
        || !v.code.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err("code must be 3-20 letters or digits".into());
    }
    if v.name.is_empty() {
        return Err("name is required".into());
    }
    if !marketplace && (v.discount_type == DiscountType::Shipping || v.category_id.is_some()) {
        return Err("shop vouchers only support percent or nominal discounts".into());
    }
    if v.quota <= 0 {
        return Err("quota must be positive".into());
    }
    if v.min_spending < Decimal::ZERO {
        return Err("min_spending must not be negative".into());
    }
    if matches!(v.max_discount, Some(cap) if cap <= Decimal::ZERO) {
        return Err("max_discount must be positive".into());
    }
    let discount = Discount {
        kind: v.discount_type,
        amount: v.amount,
    };
    validate_discount(&discount, v.start_at, v.end_at)?;
    Ok(v)
}
