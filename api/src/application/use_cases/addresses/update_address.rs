use uuid::Uuid;

use crate::application::ports::address_repository::AddressRepository;
use crate::application::ports::location_repository::LocationRepository;
use crate::application::use_cases::addresses::{AddressError, not_found_if_missing, validate};
use crate::domain::users::user::{Address, NewAddress};

pub struct UpdateAddress<'a, R, L>
where
    R: AddressRepository + ?Sized,
    L: LocationRepository + ?Sized,
{
    pub repo: &'a R,
    pub locations: &'a L,
}

impl<'a, R, L> UpdateAddress<'a, R, L>
where
    R: AddressRepository + ?Sized,
    L: LocationRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        input: NewAddress,
    ) -> Result<Address, AddressError> {
        let input = validate(self.locations, input).await?;
        not_found_if_missing(self.repo.update(user_id, address_id, &input).await?)
    }
}
