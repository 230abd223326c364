use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::users::user::{ProfileUpdate, User, UserCredentials, UserProfile};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        username: &str,
        full_name: &str,
        password_hash: &str,
    ) -> anyhow::Result<User>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;
    // Matches either the email or the username
    async fn find_credentials(&self, identifier: &str) -> anyhow::Result<Option<UserCredentials>>;
    async fn find_credentials_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserCredentials>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()>;
    async fn get_profile(&self, id: Uuid) -> anyhow::Result<UserProfile>;
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> anyhow::Result<()>;
}
