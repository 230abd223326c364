use uuid::Uuid;

use crate::application::ports::address_repository::AddressRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::application::use_cases::addresses::{
    AddressError, log_default_change, not_found_if_missing,
};

pub struct DeleteAddress<'a, R, S>
where
    R: AddressRepository + ?Sized,
    S: ShopRepository + ?Sized,
{
    pub repo: &'a R,
    pub shops: &'a S,
}

impl<'a, R, S> DeleteAddress<'a, R, S>
where
    R: AddressRepository + ?Sized,
    S: ShopRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, address_id: Uuid) -> Result<(), AddressError> {
        let address = not_found_if_missing(self.repo.get_for_user(user_id, address_id).await?)?;
        if let Some(shop) = self.shops.get_by_owner(user_id).await? {
            if shop.address_id == address_id {
                return Err(AddressError::InUse);
            }
        }
        if !self.repo.delete(user_id, address_id).await? {
            return Err(AddressError::NotFound);
        }
        if address.is_default {
            // Promote the most recent remaining address
            if let Some(next) = self.repo.list_for_user(user_id).await?.first() {
                self.repo.set_default(user_id, next.id).await?;
                log_default_change(user_id, next.id);
            }
        }
        Ok(())
    }
}
