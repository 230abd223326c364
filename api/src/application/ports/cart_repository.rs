use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A cart item joined with everything checkout needs to price it.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub cart_item_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub sku_id: Uuid,
    pub sku_name: String,
    pub price: Decimal,
    pub stock: i32,
    pub weight_grams: i32,
    pub bulk_price: Option<Decimal>,
    pub bulk_min_quantity: Option<i32>,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_slug: String,
    pub category_id: i32,
    pub shop_id: Uuid,
    pub shop_name: String,
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<CartLine>>;
    async fn get_line(&self, user_id: Uuid, cart_item_id: Uuid) -> anyhow::Result<Option<CartLine>>;
    // Adds to the existing line for the SKU or creates one; returns the line id and new quantity,
    // or None when the merged quantity would exceed the SKU stock
    async fn upsert(
        &self,
        user_id: Uuid,
        sku_id: Uuid,
        quantity: i32,
    ) -> anyhow::Result<Option<(Uuid, i32)>>;
    async fn quantity_for_sku(&self, user_id: Uuid, sku_id: Uuid) -> anyhow::Result<i32>;
    async fn update_quantity(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> anyhow::Result<bool>;
    async fn delete(&self, user_id: Uuid, cart_item_id: Uuid) -> anyhow::Result<bool>;
}
