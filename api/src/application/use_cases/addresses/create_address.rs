use uuid::Uuid;

use crate::application::ports::address_repository::AddressRepository;
use crate::application::ports::location_repository::LocationRepository;
use crate::application::use_cases::addresses::{AddressError, validate};
use crate::domain::users::user::{Address, MAX_ADDRESSES_PER_USER, NewAddress};

pub struct CreateAddress<'a, R, L>
where
    R: AddressRepository + ?Sized,
    L: LocationRepository + ?Sized,
{
    pub repo: &'a R,
    pub locations: &'a L,
}

impl<'a, R, L> CreateAddress<'a, R, L>
where
    R: AddressRepository + ?Sized,
    L: LocationRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, input: NewAddress) -> Result<Address, AddressError> {
        let input = validate(self.locations, input).await?;
        self.repo
            .create(user_id, &input, MAX_ADDRESSES_PER_USER)
            .await?
            .ok_or(AddressError::LimitReached)
    }
}
