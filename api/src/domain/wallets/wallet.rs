use rust_decimal::Decimal;
use uuid::Uuid;

pub const MAX_PIN_ATTEMPTS: i64 = 3;
pub const PIN_LOCK_SECS: u64 = 15 * 60;

pub fn max_top_up() -> Decimal {
    Decimal::from(10_000_000)
}

pub fn max_balance() -> Decimal {
    crate::domain::pricing::max_money()
}

#[derive(Debug, Clone)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub pin_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    TopUp,
    Payment,
    Refund,
    Income,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::TopUp => "top_up",
            HistoryKind::Payment => "payment",
            HistoryKind::Refund => "refund",
            HistoryKind::Income => "income",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top_up" => Some(HistoryKind::TopUp),
            "payment" => Some(HistoryKind::Payment),
            "refund" => Some(HistoryKind::Refund),
            "income" => Some(HistoryKind::Income),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WalletHistory {
    pub id: Uuid,
    pub wallet_id: Uuid,
    /// Signed: credits positive, debits negative.
    pub amount: Decimal,
    pub kind: HistoryKind,
    pub reference_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub fn pin_attempts_key(user_id: Uuid) -> String {
    format!("wallet:pin_attempts:{}", user_id)
}
