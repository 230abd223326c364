use crate::application::ports::user_repository::UserRepository;
use crate::application::services::hashing;
use crate::application::use_cases::auth::AuthError;
use crate::domain::users::user::User;

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Email or username
    pub identifier: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    pub async fn execute(&self, req: &LoginRequest) -> Result<User, AuthError> {
        let identifier = req.identifier.trim().to_lowercase();
        let Some(row) = self.repo.find_credentials(&identifier).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        if hashing::verify_secret(&req.password, &row.password_hash)? {
            Ok(row.user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}
