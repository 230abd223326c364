use uuid::Uuid;

use crate::application::ports::user_repository::UserRepository;
use crate::application::services::hashing;
use crate::application::use_cases::users::UserError;
use crate::domain::users::credentials;

pub struct ChangePassword<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> ChangePassword<'a, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        current: &str,
        new_password: &str,
    ) -> Result<(), UserError> {
        let row = self
            .repo
            .find_credentials_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)?;
        if !hashing::verify_secret(current, &row.password_hash)? {
            return Err(UserError::WrongPassword);
        }
        credentials::validate_password(new_password, &row.user.username)?;
        if current == new_password {
            return Err(UserError::InvalidInput(
                "new password must differ from the current one".into(),
            ));
        }
        let hash = hashing::hash_secret(new_password)?;
        self.repo.update_password(user_id, &hash).await?;
        tracing::info!(user_id = %user_id, "password_changed");
        Ok(())
    }
}
