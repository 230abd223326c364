use uuid::Uuid;

use crate::application::ports::wallet_repository::WalletRepository;
use crate::application::services::hashing;
use crate::application::use_cases::wallets::WalletError;
use crate::domain::users::credentials;

/// Requires a step-up window instead of the old PIN, so a forgotten PIN can
/// be reset with the account password.
pub struct ChangePin<'a, R: WalletRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: WalletRepository + ?Sized> ChangePin<'a, R> {
    pub async fn execute(&self, user_id: Uuid, new_pin: &str) -> Result<(), WalletError> {
        credentials::validate_pin(new_pin)?;
        let wallet = self
            .repo
            .get_by_user(user_id)
            .await?
            .ok_or(WalletError::NotFound)?;
        let hash = hashing::hash_secret(new_pin)?;
        self.repo.update_pin(wallet.id, &hash).await?;
        tracing::info!(wallet_id = %wallet.id, "wallet_pin_changed");
        Ok(())
    }
}
