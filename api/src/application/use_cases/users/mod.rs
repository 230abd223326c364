use crate::domain::users::credentials::CredentialError;

pub mod change_password;
pub mod profile;

#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    InvalidCredentialFormat(#[from] CredentialError),
    #[error("current password is incorrect")]
    WrongPassword,
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}
