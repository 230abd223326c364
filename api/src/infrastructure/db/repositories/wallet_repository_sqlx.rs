use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::application::ports::wallet_repository::{PayOutcome, WalletRepository};
use crate::domain::orders::status::OrderStatus;
use crate::domain::pagination::PageRequest;
use crate::domain::wallets::wallet::{HistoryKind, Wallet, WalletHistory};
use crate::infrastructure::db::PgPool;

pub struct SqlxWalletRepository {
    pub pool: PgPool,
}

impl SqlxWalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const WALLET_COLUMNS: &str = "id, user_id, balance, pin_hash, created_at";

fn wallet_from_row(r: &PgRow) -> Wallet {
    Wallet {
        id: r.get("id"),
        user_id: r.get("user_id"),
        balance: r.get("balance"),
        pin_hash: r.get("pin_hash"),
        created_at: r.get("created_at"),
    }
}

fn history_from_row(r: &PgRow) -> anyhow::Result<WalletHistory> {
    let kind: String = r.get("kind");
    Ok(WalletHistory {
        id: r.get("id"),
        wallet_id: r.get("wallet_id"),
        amount: r.get("amount"),
        kind: HistoryKind::parse(&kind)
            .ok_or_else(|| anyhow::anyhow!("unknown wallet history kind {}", kind))?,
        reference_id: r.get("reference_id"),
        created_at: r.get("created_at"),
    })
}

async fn record_history(
    tx: &mut Transaction<'_, Postgres>,
    wallet_id: Uuid,
    amount: Decimal,
    kind: HistoryKind,
    reference_id: Option<Uuid>,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO wallet_histories (wallet_id, amount, kind, reference_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(wallet_id)
    .bind(amount)
    .bind(kind.as_str())
    .bind(reference_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Credits the wallet owned by `user_id` inside an open transaction.
/// Returns false when the user has no wallet.
pub(crate) async fn credit_user_wallet(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount: Decimal,
    kind: HistoryKind,
    reference_id: Uuid,
) -> anyhow::Result<bool> {
    let wallet_id: Option<Uuid> = sqlx::query_scalar(
        "UPDATE wallets SET balance = balance + $2 WHERE user_id = $1 RETURNING id",
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(&mut **tx)
    .await?;
    let Some(wallet_id) = wallet_id else {
        return Ok(false);
    };
    record_history(tx, wallet_id, amount, kind, Some(reference_id)).await?;
    Ok(true)
}

#[async_trait]
impl WalletRepository for SqlxWalletRepository {
    async fn create(&self, user_id: Uuid, pin_hash: &str) -> anyhow::Result<Wallet> {
        let row = sqlx::query(&format!(
            "INSERT INTO wallets (user_id, pin_hash) VALUES ($1, $2) RETURNING {}",
            WALLET_COLUMNS
        ))
        .bind(user_id)
        .bind(pin_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(wallet_from_row(&row))
    }

    async fn get_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Wallet>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wallets WHERE user_id = $1",
            WALLET_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(wallet_from_row))
    }

    async fn history(
        &self,
        wallet_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<WalletHistory>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM wallet_histories WHERE wallet_id = $1")
                .bind(wallet_id)
                .fetch_one(&self.pool)
                .await?;
        let rows = sqlx::query(
            r#"SELECT id, wallet_id, amount, kind, reference_id, created_at FROM wallet_histories
               WHERE wallet_id = $1 ORDER BY created_at DESC, id LIMIT $2 OFFSET $3"#,
        )
        .bind(wallet_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let items = rows
            .iter()
            .map(history_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn top_up(
        &self,
        wallet_id: Uuid,
        amount: Decimal,
        max_balance: Decimal,
    ) -> anyhow::Result<Option<Wallet>> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            "UPDATE wallets SET balance = balance + $2 WHERE id = $1 AND balance + $2 <= $3 RETURNING {}",
            WALLET_COLUMNS
        ))
        .bind(wallet_id)
        .bind(amount)
        .bind(max_balance)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        record_history(&mut tx, wallet_id, amount, HistoryKind::TopUp, None).await?;
        tx.commit().await?;
        Ok(Some(wallet_from_row(&row)))
    }

    async fn update_pin(&self, wallet_id: Uuid, pin_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE wallets SET pin_hash = $2 WHERE id = $1")
            .bind(wallet_id)
            .bind(pin_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn pay_invoice(
        &self,
        wallet_id: Uuid,
        user_id: Uuid,
        invoice_id: Uuid,
    ) -> anyhow::Result<PayOutcome> {
        let mut tx = self.pool.begin().await?;
        // Lock the unpaid shop orders so a concurrent cancel cannot slip in
        let unpaid: Vec<(Uuid, Decimal)> = sqlx::query_as(
            r#"SELECT o.id, o.total FROM invoice_per_shops o
               JOIN invoices i ON i.id = o.invoice_id
               WHERE o.invoice_id = $1 AND i.user_id = $2 AND o.status = $3
               FOR UPDATE OF o"#,
        )
        .bind(invoice_id)
        .bind(user_id)
        .bind(OrderStatus::WaitingPayment.as_str())
        .fetch_all(&mut *tx)
        .await?;
        if unpaid.is_empty() {
            return Ok(PayOutcome::NothingToPay);
        }
        let amount: Decimal = unpaid.iter().map(|(_, total)| *total).sum();

        let row = sqlx::query(&format!(
            "UPDATE wallets SET balance = balance - $2 WHERE id = $1 AND balance >= $2 RETURNING {}",
            WALLET_COLUMNS
        ))
        .bind(wallet_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(PayOutcome::InsufficientBalance);
        };

        let ids: Vec<Uuid> = unpaid.iter().map(|(id, _)| *id).collect();
        sqlx::query("UPDATE invoice_per_shops SET status = $2, updated_at = now() WHERE id = ANY($1)")
            .bind(&ids)
            .bind(OrderStatus::WaitingSeller.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO invoice_statuses (invoice_per_shop_id, status) SELECT UNNEST($1::uuid[]), $2",
        )
        .bind(&ids)
        .bind(OrderStatus::WaitingSeller.as_str())
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE invoices SET status = 'paid', paid_at = now() WHERE id = $1")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;
        record_history(&mut tx, wallet_id, -amount, HistoryKind::Payment, Some(invoice_id)).await?;

        tx.commit().await?;
        Ok(PayOutcome::Paid {
            wallet: wallet_from_row(&row),
            amount,
        })
    }
}
