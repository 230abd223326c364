use uuid::Uuid;

use crate::application::ports::address_repository::AddressRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::use_cases::shops::ShopError;
use crate::domain::products::slug;
use crate::domain::shops::shop::Shop;

pub struct CreateShop<'a, S, A>
where
    S: ShopRepository + ?Sized,
    A: AddressRepository + ?Sized,
{
    pub shops: &'a S,
    pub addresses: &'a A,
}

#[derive(Debug, Clone)]
pub struct CreateShopRequest {
    pub name: String,
    pub description: String,
    pub address_id: Uuid,
    pub courier_ids: Vec<i32>,
}

impl<'a, S, A> CreateShop<'a, S, A>
where
    S: ShopRepository + ?Sized,
    A: AddressRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, req: CreateShopRequest) -> Result<Shop, ShopError> {
        let name = req.name.trim();
        if name.chars().count() < 3 || name.chars().count() > 60 {
            return Err(ShopError::InvalidInput("name must be 3-60 characters".into()));
        }
        if req.courier_ids.is_empty() {
            return Err(ShopError::InvalidInput("enable at least one courier".into()));
        }
        if self.shops.get_by_owner(user_id).await?.is_some() {
            return Err(ShopError::AlreadyExists);
        }
        if self.shops.name_exists(name).await? {
            return Err(ShopError::NameTaken);
        }
        if self
            .addresses
            .get_for_user(user_id, req.address_id)
            .await?
            .is_none()
        {
            return Err(ShopError::AddressNotFound);
        }

        let base = slug::slugify(name);
        let mut n = 0;
        let shop_slug = loop {
            let candidate = slug::with_suffix(&base, n);
            if !self.shops.slug_exists(&candidate).await? {
                break candidate;
            }
            n += 1;
        };

        let shop = self
            .shops
            .create(
                user_id,
                name,
                &shop_slug,
                req.description.trim(),
                req.address_id,
            )
            .await?;
        if !self.shops.set_couriers(shop.id, &req.courier_ids).await? {
            return Err(ShopError::CourierNotFound);
        }
        tracing::info!(user_id = %user_id, shop_id = %shop.id, "shop_created");
        Ok(shop)
    }
}
