use crate::application::ports::user_repository::UserRepository;
use crate::application::services::hashing;
use crate::application::use_cases::auth::AuthError;
use crate::domain::users::credentials;
use crate::domain::users::user::User;

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: &RegisterRequest) -> Result<User, AuthError> {
        let email = credentials::normalize_email(&req.email);
        let username = req.username.trim().to_string();
        credentials::validate_email(&email)?;
        credentials::validate_username(&username)?;
        credentials::validate_password(&req.password, &username)?;

        if self.repo.email_exists(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.repo.username_exists(&username).await? {
            return Err(AuthError::UsernameTaken);
        }

        let hash = hashing::hash_secret(&req.password)?;
        let full_name = match req.full_name.trim() {
            "" => username.clone(),
            name => name.to_string(),
        };
        let user = self
            .repo
            .create_user(&email, &username, &full_name, &hash)
            .await?;
        tracing::info!(user_id = %user.id, "user_registered");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::InMemoryUsers;

    fn request(email: &str, username: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            username: username.into(),
            full_name: "".into(),
            password: "Sup3rSecret".into(),
        }
    }

    #[tokio::test]
    async fn registers_and_rejects_duplicates() {
        let repo = InMemoryUsers::default();
        let uc = Register { repo: &repo };
        let user = uc.execute(&request("Buyer@Example.com", "buyer")).await.unwrap();
        assert_eq!(user.email, "buyer@example.com");
        assert_eq!(user.full_name, "buyer");

        let dup_email = uc.execute(&request("buyer@example.com", "other")).await;
        assert!(matches!(dup_email, Err(AuthError::EmailTaken)));
        let dup_name = uc.execute(&request("other@example.com", "buyer")).await;
        assert!(matches!(dup_name, Err(AuthError::UsernameTaken)));
    }

    #[tokio::test]
    async fn rejects_weak_password() {
        let repo = InMemoryUsers::default();
        let uc = Register { repo: &repo };
        let mut req = request("a@example.com", "alice");
        req.password = "password".into();
        assert!(matches!(
            uc.execute(&req).await,
            Err(AuthError::InvalidCredentialFormat(_))
        ));
    }
}
