use uuid::Uuid;

use crate::application::ports::wallet_repository::WalletRepository;
use crate::application::use_cases::wallets::WalletError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::wallets::wallet::{Wallet, WalletHistory};

pub struct GetWallet<'a, R: WalletRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: WalletRepository + ?Sized> GetWallet<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Wallet, WalletError> {
        self.repo
            .get_by_user(user_id)
            .await?
            .ok_or(WalletError::NotFound)
    }
}

pub struct WalletHistoryList<'a, R: WalletRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: WalletRepository + ?Sized> WalletHistoryList<'a, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<WalletHistory>, WalletError> {
        let wallet = GetWallet { repo: self.repo }.execute(user_id).await?;
        let (items, total) = self.repo.history(wallet.id, page).await?;
        Ok(Page::new(items, page, total))
    }
}
