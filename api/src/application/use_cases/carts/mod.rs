use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::ports::cart_repository::{CartLine, CartRepository};
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::shop_repository::ShopRepository;

#[derive(thiserror::Error, Debug)]
pub enum CartError {
    #[error("sku not found")]
    SkuNotFound,
    #[error("cart item not found")]
    ItemNotFound,
    #[error("cannot buy from your own shop")]
    OwnProduct,
    #[error("insufficient stock")]
    InsufficientStock,
    #[error("quantity must be positive")]
    InvalidQuantity,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

/// Cart lines of one shop, in the order they were listed.
#[derive(Debug, Clone)]
pub struct CartShopGroup {
    pub shop_id: Uuid,
    pub shop_name: String,
    pub lines: Vec<CartLine>,
}

impl CartShopGroup {
    /// Undiscounted value of the group at list prices.
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(|l| l.price * Decimal::from(l.quantity))
            .sum()
    }
}

pub fn group_by_shop(lines: Vec<CartLine>) -> Vec<CartShopGroup> {
    let mut groups: Vec<CartShopGroup> = Vec::new();
    for line in lines {
        match groups.iter_mut().find(|g| g.shop_id == line.shop_id) {
            Some(group) => group.lines.push(line),
            None => groups.push(CartShopGroup {
                shop_id: line.shop_id,
                shop_name: line.shop_name.clone(),
                lines: vec![line],
            }),
        }
    }
    groups
}

pub struct Cart<'a, C, P, S>
where
    C: CartRepository + ?Sized,
    P: ProductRepository + ?Sized,
    S: ShopRepository + ?Sized,
{
    pub carts: &'a C,
    pub products: &'a P,
    pub shops: &'a S,
}

impl<'a, C, P, S> Cart<'a, C, P, S>
where
    C: CartRepository + ?Sized,
    P: ProductRepository + ?Sized,
    S: ShopRepository + ?Sized,
{
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<CartShopGroup>, CartError> {
        Ok(group_by_shop(self.carts.list_for_user(user_id).await?))
    }

    /// Adds `quantity` units, merging into an existing line for the SKU.
    pub async fn add(&self, user_id: Uuid, sku_id: Uuid, quantity: i32) -> Result<CartLine, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity);
        }
        let sku = self
            .products
            .find_sku(sku_id)
            .await?
            .filter(|s| !s.is_archived)
            .ok_or(CartError::SkuNotFound)?;
        if let Some(shop) = self.shops.get_by_id(sku.shop_id).await? {
            if shop.is_owned_by(user_id) {
                return Err(CartError::OwnProduct);
            }
        }
        let existing = self.carts.quantity_for_sku(user_id, sku_id).await?;
        if existing.checked_add(quantity).is_none_or(|q| q > sku.stock) {
            return Err(CartError::InsufficientStock);
        }
        let (line_id, _) = self
            .carts
            .upsert(user_id, sku_id, quantity)
            .await?
            .ok_or(CartError::InsufficientStock)?;
        self.carts
            .get_line(user_id, line_id)
            .await?
            .ok_or(CartError::ItemNotFound)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity);
        }
        let line = self
            .carts
            .get_line(user_id, cart_item_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;
        if quantity > line.stock {
            return Err(CartError::InsufficientStock);
        }
        if !self.carts.update_quantity(user_id, cart_item_id, quantity).await? {
            return Err(CartError::ItemNotFound);
        }
        Ok(CartLine { quantity, ..line })
    }

    pub async fn delete(&self, user_id: Uuid, cart_item_id: Uuid) -> Result<(), CartError> {
        if !self.carts.delete(user_id, cart_item_id).await? {
            return Err(CartError::ItemNotFound);
        }
        Ok(())
    }
}
