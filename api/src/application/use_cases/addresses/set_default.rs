use uuid::Uuid;

use crate::application::ports::address_repository::AddressRepository;
use crate::application::use_cases::addresses::{AddressError, log_default_change};

pub struct SetDefaultAddress<'a, R: AddressRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AddressRepository + ?Sized> SetDefaultAddress<'a, R> {
    pub async fn execute(&self, user_id: Uuid, address_id: Uuid) -> Result<(), AddressError> {
        if !self.repo.set_default(user_id, address_id).await? {
            return Err(AddressError::NotFound);
        }
        log_default_change(user_id, address_id);
        Ok(())
    }
}
