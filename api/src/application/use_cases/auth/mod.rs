use crate::domain::users::credentials::CredentialError;

pub mod login;
pub mod register;
pub mod step_up;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    InvalidCredentialFormat(#[from] CredentialError),
    #[error("email already registered")]
    EmailTaken,
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}
