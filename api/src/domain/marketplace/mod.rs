pub mod banner;
pub mod voucher;
