//! Checkout: prices the selected cart lines per shop, applies promotions,
//! vouchers and shipping, and persists the invoice aggregate.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::ports::address_repository::AddressRepository;
use crate::application::ports::cart_repository::{CartLine, CartRepository};
use crate::application::ports::order_repository::{CreateInvoiceError, OrderRepository};
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::ports::voucher_repository::VoucherRepository;
use crate::domain::marketplace::voucher::MarketplaceVoucher;
use crate::domain::orders::invoice::{Invoice, NewInvoice, NewShopOrder, NewTransactionLine};
use crate::domain::pricing::{self, Discount};
use crate::domain::shops::voucher::normalize_code;

#[derive(thiserror::Error, Debug)]
pub enum CheckoutError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("address not found")]
    AddressNotFound,
    #[error("shop not found")]
    ShopNotFound,
    #[error("courier not found")]
    CourierNotFound,
    #[error("cart item not found")]
    CartItemNotFound,
    #[error("quantity does not match the cart")]
    QuantityMismatch,
    #[error("insufficient stock")]
    InsufficientStock,
    #[error("voucher is invalid")]
    InvalidVoucher,
    #[error("minimum spending not reached")]
    BelowMinimumSpend,
    #[error("total mismatch: expected {expected}, got {declared}")]
    TotalMismatch { expected: Decimal, declared: Decimal },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct CheckoutItem {
    pub cart_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CheckoutShop {
    pub shop_id: Uuid,
    pub courier_id: i32,
    pub voucher_code: Option<String>,
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub address_id: Uuid,
    pub shops: Vec<CheckoutShop>,
    pub marketplace_voucher_code: Option<String>,
    /// Total the client displayed; must match the computed one.
    pub total: Decimal,
}

pub struct Checkout<'a, A, S, C, P, V, O>
where
    A: AddressRepository + ?Sized,
    S: ShopRepository + ?Sized,
    C: CartRepository + ?Sized,
    P: ProductRepository + ?Sized,
    V: VoucherRepository + ?Sized,
    O: OrderRepository + ?Sized,
{
    pub addresses: &'a A,
    pub shops: &'a S,
    pub carts: &'a C,
    pub products: &'a P,
    pub vouchers: &'a V,
    pub orders: &'a O,
}

struct PricedShop {
    order: NewShopOrder,
    category_ids: Vec<i32>,
}

impl<'a, A, S, C, P, V, O> Checkout<'a, A, S, C, P, V, O>
where
    A: AddressRepository + ?Sized,
    S: ShopRepository + ?Sized,
    C: CartRepository + ?Sized,
    P: ProductRepository + ?Sized,
    V: VoucherRepository + ?Sized,
    O: OrderRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, req: &CheckoutRequest) -> Result<Invoice, CheckoutError> {
        let invoice = self.preview(user_id, req).await?;
        if invoice.total_payment != req.total {
            return Err(CheckoutError::TotalMismatch {
                expected: invoice.total_payment,
                declared: req.total,
            });
        }
        let created = self
            .orders
            .create_invoice(&invoice)
            .await
            .map_err(|e| match e {
                CreateInvoiceError::StockExhausted(_) => CheckoutError::InsufficientStock,
                CreateInvoiceError::VoucherExhausted => CheckoutError::InvalidVoucher,
                CreateInvoiceError::CartItemGone(_) => CheckoutError::CartItemNotFound,
                CreateInvoiceError::Other(e) => CheckoutError::Internal(e),
            })?;
        tracing::info!(
            user_id = %user_id,
            invoice_id = %created.id,
            shops = invoice.shops.len(),
            total = %created.total_payment,
            "invoice_created"
        );
        Ok(created)
    }

    /// Computes the invoice without persisting it or checking the declared total.
    pub async fn preview(&self, user_id: Uuid, req: &CheckoutRequest) -> Result<NewInvoice, CheckoutError> {
        validate_shape(req)?;
        let now = Utc::now();

        let address = self
            .addresses
            .get_for_user(user_id, req.address_id)
            .await?
            .ok_or(CheckoutError::AddressNotFound)?;

        let marketplace_voucher = match req.marketplace_voucher_code.as_deref() {
            Some(code) => Some(self.marketplace_voucher(code, now).await?),
            None => None,
        };

        let mut promotions: HashMap<Uuid, Option<Discount>> = HashMap::new();
        let mut priced = Vec::with_capacity(req.shops.len());
        for group in &req.shops {
            priced.push(self.price_shop(user_id, group, now, &mut promotions).await?);
        }

        let marketplace_voucher_id = match marketplace_voucher {
            Some(voucher) => {
                apply_marketplace_voucher(&voucher, &mut priced)?;
                Some(voucher.id)
            }
            None => None,
        };

        let shops: Vec<NewShopOrder> = priced.into_iter().map(|p| p.order).collect();
        let mut invoice = NewInvoice {
            user_id,
            address_snapshot: address.snapshot(),
            marketplace_voucher_id,
            total_goods: Decimal::ZERO,
            shop_discount: Decimal::ZERO,
            marketplace_discount: Decimal::ZERO,
            total_shipping: Decimal::ZERO,
            total_payment: Decimal::ZERO,
            shops: Vec::new(),
        };
        for shop in &shops {
            invoice.total_goods += shop.subtotal;
            invoice.shop_discount += shop.shop_discount;
            invoice.marketplace_discount += shop.marketplace_discount;
            invoice.total_shipping += shop.shipping_cost;
            invoice.total_payment += shop.total;
        }
        invoice.shops = shops;
        Ok(invoice)
    }

    async fn marketplace_voucher(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<MarketplaceVoucher, CheckoutError> {
        self.vouchers
            .find_marketplace_voucher(&normalize_code(code))
            .await?
            .filter(|v| v.is_redeemable(now))
            .ok_or(CheckoutError::InvalidVoucher)
    }

    async fn price_shop(
        &self,
        user_id: Uuid,
        group: &CheckoutShop,
        now: DateTime<Utc>,
        promotions: &mut HashMap<Uuid, Option<Discount>>,
    ) -> Result<PricedShop, CheckoutError> {
        let shop = self
            .shops
            .get_by_id(group.shop_id)
            .await?
            .ok_or(CheckoutError::ShopNotFound)?;
        if shop.is_owned_by(user_id) {
            return Err(CheckoutError::InvalidRequest(
                "cannot buy from your own shop".into(),
            ));
        }
        let courier = self
            .shops
            .find_courier(shop.id, group.courier_id)
            .await?
            .ok_or(CheckoutError::CourierNotFound)?;

        let mut lines = Vec::with_capacity(group.items.len());
        let mut category_ids = Vec::with_capacity(group.items.len());
        let mut subtotal = Decimal::ZERO;
        let mut weight: i64 = 0;
        for item in &group.items {
            let line = self.cart_line(user_id, shop.id, item).await?;
            let promo = match promotions.get(&line.product_id) {
                Some(cached) => *cached,
                None => {
                    let found = self
                        .products
                        .active_promotion(line.product_id, now)
                        .await?
                        .map(|p| p.discount());
                    promotions.insert(line.product_id, found);
                    found
                }
            };
            let bulk = match (line.bulk_price, line.bulk_min_quantity) {
                (Some(price), Some(min_quantity)) => Some(pricing::BulkPrice {
                    price,
                    min_quantity,
                }),
                _ => None,
            };
            let unit = pricing::unit_price(line.price, line.quantity, promo.as_ref(), bulk.as_ref());
            let total = unit * Decimal::from(line.quantity);
            subtotal += total;
            weight += i64::from(line.weight_grams) * i64::from(line.quantity);
            category_ids.push(line.category_id);
            lines.push(NewTransactionLine {
                cart_item_id: line.cart_item_id,
                sku_id: line.sku_id,
                product_id: line.product_id,
                product_name: line.product_name,
                sku_name: line.sku_name,
                quantity: line.quantity,
                unit_price: line.price,
                discounted_unit_price: unit,
                total,
            });
        }

        let (shop_voucher_id, shop_discount) = match group.voucher_code.as_deref() {
            Some(code) => {
                let voucher = self
                    .vouchers
                    .find_shop_voucher(shop.id, &normalize_code(code))
                    .await?
                    .filter(|v| v.is_redeemable(now))
                    .ok_or(CheckoutError::InvalidVoucher)?;
                if subtotal < voucher.min_spending {
                    return Err(CheckoutError::BelowMinimumSpend);
                }
                let discount =
                    pricing::voucher_discount(&voucher.discount(), None, subtotal, Decimal::ZERO);
                (Some(voucher.id), discount)
            }
            None => (None, Decimal::ZERO),
        };

        let shipping_cost = courier.cost_for(weight);
        Ok(PricedShop {
            order: NewShopOrder {
                shop_id: shop.id,
                shop_name: shop.name,
                shop_voucher_id,
                courier_id: courier.id,
                subtotal,
                shop_discount,
                marketplace_discount: Decimal::ZERO,
                shipping_cost,
                total: subtotal - shop_discount + shipping_cost,
                lines,
            },
            category_ids,
        })
    }

    async fn cart_line(
        &self,
        user_id: Uuid,
        shop_id: Uuid,
        item: &CheckoutItem,
    ) -> Result<CartLine, CheckoutError> {
        let line = self
            .carts
            .get_line(user_id, item.cart_item_id)
            .await?
            .filter(|l| l.user_id == user_id && l.shop_id == shop_id)
            .ok_or(CheckoutError::CartItemNotFound)?;
        if line.quantity != item.quantity {
            return Err(CheckoutError::QuantityMismatch);
        }
        if line.stock < line.quantity {
            return Err(CheckoutError::InsufficientStock);
        }
        Ok(line)
    }
}

fn validate_shape(req: &CheckoutRequest) -> Result<(), CheckoutError> {
    if req.shops.is_empty() {
        return Err(CheckoutError::InvalidRequest("no shops to check out".into()));
    }
    let mut shop_ids = HashSet::new();
    let mut item_ids = HashSet::new();
    for group in &req.shops {
        if !shop_ids.insert(group.shop_id) {
            return Err(CheckoutError::InvalidRequest("duplicate shop".into()));
        }
        if group.items.is_empty() {
            return Err(CheckoutError::InvalidRequest("shop has no items".into()));
        }
        for item in &group.items {
            if item.quantity <= 0 {
                return Err(CheckoutError::InvalidRequest("quantity must be positive".into()));
            }
            if !item_ids.insert(item.cart_item_id) {
                return Err(CheckoutError::InvalidRequest("duplicate cart item".into()));
            }
        }
    }
    if req.total < Decimal::ZERO {
        return Err(CheckoutError::InvalidRequest("total must not be negative".into()));
    }
    Ok(())
}

/// Applies the marketplace voucher over every shop and spreads the discount
/// across shops proportionally to their totals.
fn apply_marketplace_voucher(
    voucher: &MarketplaceVoucher,
    shops: &mut [PricedShop],
) -> Result<(), CheckoutError> {
    let all_in_category = shops
        .iter()
        .flat_map(|s| s.category_ids.iter())
        .all(|c| voucher.allows_category(*c));
    if !all_in_category {
        return Err(CheckoutError::InvalidVoucher);
    }
    let goods: Decimal = shops
        .iter()
        .map(|s| s.order.subtotal - s.order.shop_discount)
        .sum();
    if goods < voucher.min_spending {
        return Err(CheckoutError::BelowMinimumSpend);
    }
    let shipping: Decimal = shops.iter().map(|s| s.order.shipping_cost).sum();
    let discount = pricing::voucher_discount(&voucher.discount(), voucher.max_discount, goods, shipping);
    let weights: Vec<Decimal> = shops.iter().map(|s| s.order.total).collect();
    for (shop, share) in shops.iter_mut().zip(pricing::allocate(discount, &weights)) {
        shop.order.marketplace_discount = share;
        shop.order.total -= share;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::CheckoutFixture;
    use crate::domain::pricing::DiscountType;
    use rust_decimal_macros::dec;

    // Fixture: buyer with one address, shop A (courier 1: 9000 + 2000/kg)
    // selling "Kaos" at 50000 (500 g, stock 10), shop B (courier 1) selling
    // "Topi" at 30000 (200 g, stock 3). Cart: 2x Kaos, 1x Topi.

    fn request(fx: &CheckoutFixture, total: Decimal) -> CheckoutRequest {
        CheckoutRequest {
            address_id: fx.address.id,
            shops: vec![
                CheckoutShop {
                    shop_id: fx.shop_a.id,
                    courier_id: 1,
                    voucher_code: None,
                    items: vec![CheckoutItem {
                        cart_item_id: fx.kaos_line,
                        quantity: 2,
                    }],
                },
                CheckoutShop {
                    shop_id: fx.shop_b.id,
                    courier_id: 1,
                    voucher_code: None,
                    items: vec![CheckoutItem {
                        cart_item_id: fx.topi_line,
                        quantity: 1,
                    }],
                },
            ],
            marketplace_voucher_code: None,
            total,
        }
    }

    #[tokio::test]
    async fn happy_path_persists_and_clears_cart() {
        let fx = CheckoutFixture::new();
        // A: 100000 + 11000 shipping, B: 30000 + 11000 shipping
        let invoice = fx.checkout().execute(fx.buyer, &request(&fx, dec!(152000))).await.unwrap();
        assert_eq!(invoice.total_payment, dec!(152000));
        assert_eq!(invoice.total_shipping, dec!(22000));
        assert!(fx.carts.list_for_user(fx.buyer).await.unwrap().is_empty());
        assert_eq!(fx.sku_stock(fx.kaos_sku), 8);
        assert_eq!(fx.sku_stock(fx.topi_sku), 2);
    }

    #[tokio::test]
    async fn total_mismatch_reports_expected() {
        let fx = CheckoutFixture::new();
        let err = fx
            .checkout()
            .execute(fx.buyer, &request(&fx, dec!(150000)))
            .await
            .unwrap_err();
        match err {
            CheckoutError::TotalMismatch { expected, declared } => {
                assert_eq!(expected, dec!(152000));
                assert_eq!(declared, dec!(150000));
            }
            other => panic!("unexpected {other:?}"),
        }
        // Nothing persisted
        assert_eq!(fx.carts.list_for_user(fx.buyer).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_malformed_requests() {
        let fx = CheckoutFixture::new();
        let mut req = request(&fx, dec!(0));
        req.shops[1].shop_id = fx.shop_a.id;
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::InvalidRequest(_))
        ));

        let mut req = request(&fx, dec!(0));
        req.shops.clear();
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn resolution_errors() {
        let fx = CheckoutFixture::new();

        let mut req = request(&fx, dec!(0));
        req.address_id = Uuid::new_v4();
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::AddressNotFound)
        ));

        let mut req = request(&fx, dec!(0));
        req.shops[0].shop_id = Uuid::new_v4();
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::ShopNotFound)
        ));

        let mut req = request(&fx, dec!(0));
        req.shops[0].courier_id = 2;
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::CourierNotFound)
        ));

        // Topi line belongs to shop B
        let mut req = request(&fx, dec!(0));
        req.shops[0].items[0].cart_item_id = fx.topi_line;
        req.shops[1].items[0].cart_item_id = fx.kaos_line;
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::CartItemNotFound)
        ));

        // Someone else's cart
        assert!(matches!(
            fx.checkout().preview(Uuid::new_v4(), &request(&fx, dec!(0))).await,
            Err(CheckoutError::AddressNotFound)
        ));
    }

    #[tokio::test]
    async fn quantity_and_stock_checks() {
        let fx = CheckoutFixture::new();
        let mut req = request(&fx, dec!(0));
        req.shops[0].items[0].quantity = 3;
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::QuantityMismatch)
        ));

        fx.set_stock(fx.kaos_sku, 1);
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &request(&fx, dec!(0))).await,
            Err(CheckoutError::InsufficientStock)
        ));
    }

    #[tokio::test]
    async fn cannot_buy_from_own_shop() {
        let fx = CheckoutFixture::new();
        let seller_address = fx.add_address(fx.shop_a.user_id);
        let mut req = request(&fx, dec!(0));
        req.address_id = seller_address;
        assert!(matches!(
            fx.checkout().preview(fx.shop_a.user_id, &req).await,
            Err(CheckoutError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn promotion_and_shop_voucher() {
        let fx = CheckoutFixture::new();
        fx.add_promotion(fx.kaos_product, DiscountType::Percent, dec!(10));
        fx.add_shop_voucher(fx.shop_a.id, "HEMAT", DiscountType::Nominal, dec!(5000), dec!(50000));

        let mut req = request(&fx, dec!(0));
        req.shops[0].voucher_code = Some("hemat".into());
        let preview = fx.checkout().preview(fx.buyer, &req).await.unwrap();
        let a = &preview.shops[0];
        assert_eq!(a.lines[0].discounted_unit_price, dec!(45000));
        assert_eq!(a.subtotal, dec!(90000));
        assert_eq!(a.shop_discount, dec!(5000));
        assert_eq!(a.total, dec!(96000));

        req.shops[0].voucher_code = Some("NOPE".into());
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::InvalidVoucher)
        ));
    }

    #[tokio::test]
    async fn shop_voucher_min_spending() {
        let fx = CheckoutFixture::new();
        fx.add_shop_voucher(fx.shop_b.id, "BIG", DiscountType::Percent, dec!(10), dec!(100000));
        let mut req = request(&fx, dec!(0));
        req.shops[1].voucher_code = Some("BIG".into());
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::BelowMinimumSpend)
        ));
    }

    #[tokio::test]
    async fn bulk_price_applies_from_min_quantity() {
        let fx = CheckoutFixture::new();
        fx.set_bulk(fx.kaos_sku, dec!(40000), 2);
        let preview = fx.checkout().preview(fx.buyer, &request(&fx, dec!(0))).await.unwrap();
        assert_eq!(preview.shops[0].subtotal, dec!(80000));
    }

    #[tokio::test]
    async fn marketplace_voucher_is_allocated_across_shops() {
        let fx = CheckoutFixture::new();
        fx.add_marketplace_voucher("MEGA", None, DiscountType::Nominal, dec!(15200), dec!(0));
        let mut req = request(&fx, dec!(136800));
        req.marketplace_voucher_code = Some("mega".into());
        let preview = fx.checkout().preview(fx.buyer, &req).await.unwrap();
        // Weights 111000 and 41000 over 152000
        assert_eq!(preview.marketplace_discount, dec!(15200));
        assert_eq!(preview.shops[0].marketplace_discount, dec!(11100));
        assert_eq!(preview.shops[1].marketplace_discount, dec!(4100));
        assert_eq!(preview.total_payment, dec!(136800));

        let invoice = fx.checkout().execute(fx.buyer, &req).await.unwrap();
        assert_eq!(invoice.marketplace_voucher_id, preview.marketplace_voucher_id);
        assert_eq!(fx.marketplace_quota("MEGA"), 9);
    }

    #[tokio::test]
    async fn shipping_voucher_capped_at_shipping() {
        let fx = CheckoutFixture::new();
        fx.add_marketplace_voucher("ONGKIR", None, DiscountType::Shipping, dec!(50000), dec!(0));
        let mut req = request(&fx, dec!(0));
        req.marketplace_voucher_code = Some("ONGKIR".into());
        let preview = fx.checkout().preview(fx.buyer, &req).await.unwrap();
        assert_eq!(preview.marketplace_discount, dec!(22000));
        assert_eq!(preview.total_payment, dec!(130000));
    }

    #[tokio::test]
    async fn marketplace_voucher_restrictions() {
        let fx = CheckoutFixture::new();
        // Topi is in category 2, so a category 1 voucher cannot cover the cart
        fx.add_marketplace_voucher("FASHION", Some(1), DiscountType::Percent, dec!(10), dec!(0));
        fx.add_marketplace_voucher("MIN", None, DiscountType::Percent, dec!(10), dec!(500000));
        let mut req = request(&fx, dec!(0));
        req.marketplace_voucher_code = Some("FASHION".into());
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::InvalidVoucher)
        ));
        req.marketplace_voucher_code = Some("MIN".into());
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::BelowMinimumSpend)
        ));
        req.marketplace_voucher_code = Some("UNKNOWN".into());
        assert!(matches!(
            fx.checkout().preview(fx.buyer, &req).await,
            Err(CheckoutError::InvalidVoucher)
        ));
    }

    #[tokio::test]
    async fn lost_stock_race_maps_to_insufficient_stock() {
        let fx = CheckoutFixture::new();
        fx.orders.fail_next(CreateInvoiceError::StockExhausted(fx.kaos_sku));
        assert!(matches!(
            fx.checkout().execute(fx.buyer, &request(&fx, dec!(152000))).await,
            Err(CheckoutError::InsufficientStock)
        ));
        // The failed aggregate left the cart untouched
        assert_eq!(fx.carts.list_for_user(fx.buyer).await.unwrap().len(), 2);
    }
}
