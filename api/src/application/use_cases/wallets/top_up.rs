use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::ports::wallet_repository::WalletRepository;
use crate::application::use_cases::wallets::WalletError;
use crate::domain::wallets::wallet::{self, Wallet};

/// Callers must hold a step-up window; the handler enforces it.
pub struct TopUp<'a, R: WalletRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: WalletRepository + ?Sized> TopUp<'a, R> {
    pub async fn execute(&self, user_id: Uuid, amount: Decimal) -> Result<Wallet, WalletError> {
        if amount <= Decimal::ZERO || amount > wallet::max_top_up() || amount.scale() > 2 {
            return Err(WalletError::InvalidAmount);
        }
        let current = self
            .repo
            .get_by_user(user_id)
            .await?
            .ok_or(WalletError::NotFound)?;
        let wallet = self
            .repo
            .top_up(current.id, amount, wallet::max_balance())
            .await?
            .ok_or(WalletError::BalanceLimitReached)?;
        tracing::info!(wallet_id = %wallet.id, amount = %amount, "wallet_topped_up");
        Ok(wallet)
    }
}
