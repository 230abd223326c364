use uuid::Uuid;

use crate::application::ports::cache_port::CachePort;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::{cache, hashing};
use crate::application::use_cases::auth::AuthError;

/// Re-verifies the password and opens a short step-up window for sensitive
/// wallet operations.
pub struct StepUp<'a, R, C>
where
    R: UserRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub repo: &'a R,
    pub cache: &'a C,
    pub ttl_secs: u64,
}

impl<'a, R, C> StepUp<'a, R, C>
where
    R: UserRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, password: &str) -> Result<u64, AuthError> {
        let Some(row) = self.repo.find_credentials_by_id(user_id).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        if !hashing::verify_secret(password, &row.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        self.cache
            .set(&cache::step_up_key(user_id), "1", self.ttl_secs)
            .await?;
        Ok(self.ttl_secs)
    }
}

pub async fn has_step_up<C: CachePort + ?Sized>(cache: &C, user_id: Uuid) -> anyhow::Result<bool> {
    Ok(cache.get(&cache::step_up_key(user_id)).await?.is_some())
}
