use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::pagination::PageRequest;
use crate::domain::wallets::wallet::{Wallet, WalletHistory};

#[derive(Debug, Clone)]
pub enum PayOutcome {
    Paid { wallet: Wallet, amount: Decimal },
    InsufficientBalance,
    NothingToPay,
}

#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, pin_hash: &str) -> anyhow::Result<Wallet>;
    async fn get_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Wallet>>;
    async fn history(
        &self,
        wallet_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<WalletHistory>, i64)>;
    // None when the balance would pass `max_balance`
    async fn top_up(
        &self,
        wallet_id: Uuid,
        amount: Decimal,
        max_balance: Decimal,
    ) -> anyhow::Result<Option<Wallet>>;
    async fn update_pin(&self, wallet_id: Uuid, pin_hash: &str) -> anyhow::Result<()>;
    // Debits every unpaid shop order of the invoice and moves them to waiting_seller
    async fn pay_invoice(
        &self,
        wallet_id: Uuid,
        user_id: Uuid,
        invoice_id: Uuid,
    ) -> anyhow::Result<PayOutcome>;
}
