use uuid::Uuid;

use crate::application::ports::location_repository::LocationRepository;
use crate::domain::users::user::NewAddress;

pub mod create_address;
pub mod delete_address;
pub mod list_addresses;
pub mod set_default;
pub mod update_address;

#[derive(thiserror::Error, Debug)]
pub enum AddressError {
    #[error("address not found")]
    NotFound,
    #[error("address limit reached")]
    LimitReached,
    #[error("city does not belong to province")]
    InvalidLocation,
    #[error("address is used by your shop")]
    InUse,
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) async fn validate<L: LocationRepository + ?Sized>(
    locations: &L,
    input: NewAddress,
) -> Result<NewAddress, AddressError> {
    let input = NewAddress {
        label: input.label.trim().to_string(),
        recipient: input.recipient.trim().to_string(),
        phone: input.phone.trim().to_string(),
        street: input.street.trim().to_string(),
        postal_code: input.postal_code.trim().to_string(),
        ..input
    };
    for (field, value) in [
        ("label", &input.label),
        ("recipient", &input.recipient),
        ("phone", &input.phone),
        ("street", &input.street),
    ] {
        if value.is_empty() {
            return Err(AddressError::InvalidInput(format!("{field} is required")));
        }
    }
    if input.postal_code.len() != 5 || !input.postal_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AddressError::InvalidInput(
            "postal_code must be 5 digits".into(),
        ));
    }
    match locations.get_city(input.city_id).await? {
        Some(city) if city.province_id == input.province_id => Ok(input),
        _ => Err(AddressError::InvalidLocation),
    }
}

pub(crate) fn not_found_if_missing<T>(value: Option<T>) -> Result<T, AddressError> {
    value.ok_or(AddressError::NotFound)
}

pub(crate) fn log_default_change(user_id: Uuid, address_id: Uuid) {
    tracing::debug!(user_id = %user_id, address_id = %address_id, "default_address_changed");
}
