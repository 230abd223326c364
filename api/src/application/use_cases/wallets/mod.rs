use uuid::Uuid;

use crate::application::ports::cache_port::CachePort;
use crate::application::services::hashing;
use crate::domain::users::credentials::CredentialError;
use crate::domain::wallets::wallet::{self, MAX_PIN_ATTEMPTS, PIN_LOCK_SECS};

pub mod activate;
pub mod change_pin;
pub mod get_wallet;
pub mod pay_invoice;
pub mod top_up;

#[derive(thiserror::Error, Debug)]
pub enum WalletError {
    #[error("wallet not activated")]
    NotFound,
    #[error("wallet already activated")]
    AlreadyActivated,
    #[error(transparent)]
    InvalidPinFormat(#[from] CredentialError),
    #[error("wrong pin, {remaining} attempts left")]
    WrongPin { remaining: i64 },
    #[error("wallet locked, try again later")]
    Locked,
    #[error("top up amount must be between 1 and 10000000")]
    InvalidAmount,
    #[error("wallet balance limit reached")]
    BalanceLimitReached,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("invoice not found")]
    InvoiceNotFound,
    #[error("invoice has nothing left to pay")]
    NothingToPay,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

/// Checks `pin` against the wallet hash, counting failures in the cache.
/// The counter lives for the lock window, so the third failure locks the
/// wallet until the key expires.
pub(crate) async fn verify_pin<C: CachePort + ?Sized>(
    cache: &C,
    user_id: Uuid,
    pin: &str,
    pin_hash: &str,
) -> Result<(), WalletError> {
    let key = wallet::pin_attempts_key(user_id);
    let attempts = match cache.get(&key).await? {
        Some(raw) => raw.parse::<i64>().unwrap_or(0),
        None => 0,
    };
    if attempts >= MAX_PIN_ATTEMPTS {
        return Err(WalletError::Locked);
    }
    if hashing::verify_secret(pin, pin_hash)? {
        cache.delete(&key).await?;
        return Ok(());
    }
    let attempts = cache.incr(&key, PIN_LOCK_SECS).await?;
    if attempts >= MAX_PIN_ATTEMPTS {
        tracing::warn!(user_id = %user_id, "wallet_locked");
        return Err(WalletError::Locked);
    }
    Err(WalletError::WrongPin {
        remaining: MAX_PIN_ATTEMPTS - attempts,
    })
}
