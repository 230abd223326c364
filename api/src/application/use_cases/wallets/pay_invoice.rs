use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::ports::cache_port::CachePort;
use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::wallet_repository::{PayOutcome, WalletRepository};
use crate::application::use_cases::wallets::{WalletError, verify_pin};
use crate::domain::wallets::wallet::Wallet;

pub struct PayInvoice<'a, W, O, C>
where
    W: WalletRepository + ?Sized,
    O: OrderRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub wallets: &'a W,
    pub orders: &'a O,
    pub cache: &'a C,
}

#[derive(Debug, Clone)]
pub struct PaymentResult {
    pub wallet: Wallet,
    pub amount: Decimal,
}

impl<'a, W, O, C> PayInvoice<'a, W, O, C>
where
    W: WalletRepository + ?Sized,
    O: OrderRepository + ?Sized,
    C: CachePort + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        invoice_id: Uuid,
        pin: &str,
    ) -> Result<PaymentResult, WalletError> {
        let wallet = self
            .wallets
            .get_by_user(user_id)
            .await?
            .ok_or(WalletError::NotFound)?;
        if self.orders.get_invoice(user_id, invoice_id).await?.is_none() {
            return Err(WalletError::InvoiceNotFound);
        }
        verify_pin(self.cache, user_id, pin, &wallet.pin_hash).await?;

        match self.wallets.pay_invoice(wallet.id, user_id, invoice_id).await? {
            PayOutcome::Paid { wallet, amount } => {
                tracing::info!(
                    user_id = %user_id,
                    invoice_id = %invoice_id,
                    amount = %amount,
                    "invoice_paid"
                );
                Ok(PaymentResult { wallet, amount })
            }
            PayOutcome::InsufficientBalance => Err(WalletError::InsufficientBalance),
            PayOutcome::NothingToPay => Err(WalletError::NothingToPay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::hashing;
    use crate::application::test_support::{InMemoryOrders, InMemoryWallets, MemoryCache};
    use crate::domain::wallets::wallet;
    use rust_decimal_macros::dec;

    struct Setup {
        wallets: InMemoryWallets,
        orders: InMemoryOrders,
        cache: MemoryCache,
        user: Uuid,
        invoice: Uuid,
    }

    async fn setup(balance: Decimal) -> Setup {
        let wallets = InMemoryWallets::default();
        let orders = InMemoryOrders::default();
        let user = Uuid::new_v4();
        let wallet = wallets
            .create(user, &hashing::hash_secret("123456").unwrap())
            .await
            .unwrap();
        if balance > Decimal::ZERO {
            wallets
                .top_up(wallet.id, balance, wallet::max_balance())
                .await
                .unwrap();
        }
        let invoice = orders.seed_invoice(user);
        wallets.bill(invoice, dec!(152000));
        Setup {
            wallets,
            orders,
            cache: MemoryCache::default(),
            user,
            invoice,
        }
    }

    impl Setup {
        fn uc(&self) -> PayInvoice<'_, InMemoryWallets, InMemoryOrders, MemoryCache> {
            PayInvoice {
                wallets: &self.wallets,
                orders: &self.orders,
                cache: &self.cache,
            }
        }
    }

    #[tokio::test]
    async fn pays_once() {
        let s = setup(dec!(200000)).await;
        let paid = s.uc().execute(s.user, s.invoice, "123456").await.unwrap();
        assert_eq!(paid.amount, dec!(152000));
        assert_eq!(paid.wallet.balance, dec!(48000));
        assert!(matches!(
            s.uc().execute(s.user, s.invoice, "123456").await,
            Err(WalletError::NothingToPay)
        ));
    }

    #[tokio::test]
    async fn insufficient_balance() {
        let s = setup(dec!(100000)).await;
        assert!(matches!(
            s.uc().execute(s.user, s.invoice, "123456").await,
            Err(WalletError::InsufficientBalance)
        ));
    }

    #[tokio::test]
    async fn third_wrong_pin_locks_wallet() {
        let s = setup(dec!(200000)).await;
        assert!(matches!(
            s.uc().execute(s.user, s.invoice, "000000").await,
            Err(WalletError::WrongPin { remaining: 2 })
        ));
        assert!(matches!(
            s.uc().execute(s.user, s.invoice, "000000").await,
            Err(WalletError::WrongPin { remaining: 1 })
        ));
        assert!(matches!(
            s.uc().execute(s.user, s.invoice, "000000").await,
            Err(WalletError::Locked)
        ));
        // Even the right PIN is refused while locked
        assert!(matches!(
            s.uc().execute(s.user, s.invoice, "123456").await,
            Err(WalletError::Locked)
        ));
    }

    #[tokio::test]
    async fn correct_pin_resets_counter() {
        let s = setup(dec!(100000)).await;
        assert!(matches!(
            s.uc().execute(s.user, s.invoice, "000000").await,
            Err(WalletError::WrongPin { remaining: 2 })
        ));
        // Right PIN, payment still fails on balance, but the counter is cleared
        assert!(matches!(
            s.uc().execute(s.user, s.invoice, "123456").await,
            Err(WalletError::InsufficientBalance)
        ));
        assert!(matches!(
            s.uc().execute(s.user, s.invoice, "000000").await,
            Err(WalletError::WrongPin { remaining: 2 })
        ));
    }

    #[tokio::test]
    async fn unknown_invoice() {
        let s = setup(dec!(100000)).await;
        assert!(matches!(
            s.uc().execute(s.user, Uuid::new_v4(), "123456").await,
            Err(WalletError::InvoiceNotFound)
        ));
    }
}
