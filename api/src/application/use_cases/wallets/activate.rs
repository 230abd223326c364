use uuid::Uuid;

use crate::application::ports::wallet_repository::WalletRepository;
use crate::application::services::hashing;
use crate::application::use_cases::wallets::WalletError;
use crate::domain::users::credentials;
use crate::domain::wallets::wallet::Wallet;

pub struct ActivateWallet<'a, R: WalletRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: WalletRepository + ?Sized> ActivateWallet<'a, R> {
    pub async fn execute(&self, user_id: Uuid, pin: &str) -> Result<Wallet, WalletError> {
        credentials::validate_pin(pin)?;
        if self.repo.get_by_user(user_id).await?.is_some() {
            return Err(WalletError::AlreadyActivated);
        }
        let hash = hashing::hash_secret(pin)?;
        let wallet = self.repo.create(user_id, &hash).await?;
        tracing::info!(user_id = %user_id, wallet_id = %wallet.id, "wallet_activated");
        Ok(wallet)
    }
}
