pub mod invoice;
pub mod status;
