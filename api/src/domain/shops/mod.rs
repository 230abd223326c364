pub mod shop;
pub mod voucher;
