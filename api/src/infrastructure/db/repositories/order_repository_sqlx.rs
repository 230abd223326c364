use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::order_repository::{
    CreateInvoiceError, OrderRepository, RefundChange, ReviewTarget, Transition,
};
use crate::domain::orders::invoice::{
    Invoice, InvoiceDetail, InvoiceStatus, NewInvoice, RefundRequest, RefundStatus, ShopOrder,
    ShopOrderDetail, StatusEntry, TransactionLine,
};
use crate::domain::orders::status::OrderStatus;
use crate::domain::pagination::PageRequest;
use crate::domain::products::product::Review;
use crate::domain::wallets::wallet::HistoryKind;
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::wallet_repository_sqlx::credit_user_wallet;

pub struct SqlxOrderRepository {
    pub pool: PgPool,
}

impl SqlxOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INVOICE_COLUMNS: &str = "id, user_id, address_snapshot, marketplace_voucher_id, total_goods, shop_discount, marketplace_discount, total_shipping, total_payment, status, paid_at, created_at";

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.invoice_id, o.shop_id, sh.name AS shop_name, i.user_id AS buyer_id,
           o.shop_voucher_id, o.courier_id, o.subtotal, o.shop_discount, o.marketplace_discount,
           o.shipping_cost, o.total, o.status, o.created_at, o.updated_at
    FROM invoice_per_shops o
    JOIN invoices i ON i.id = o.invoice_id
    JOIN shops sh ON sh.id = o.shop_id
"#;

fn invoice_from_row(r: &PgRow) -> Invoice {
    Invoice {
        id: r.get("id"),
        user_id: r.get("user_id"),
        address_snapshot: r.get("address_snapshot"),
        marketplace_voucher_id: r.get("marketplace_voucher_id"),
        total_goods: r.get("total_goods"),
        shop_discount: r.get("shop_discount"),
        marketplace_discount: r.get("marketplace_discount"),
        total_shipping: r.get("total_shipping"),
        total_payment: r.get("total_payment"),
        status: InvoiceStatus::parse(r.get::<String, _>("status").as_str()),
        paid_at: r.get("paid_at"),
        created_at: r.get("created_at"),
    }
}

fn order_status(r: &PgRow) -> anyhow::Result<OrderStatus> {
    let raw: String = r.get("status");
    OrderStatus::parse(&raw).ok_or_else(|| anyhow::anyhow!("unknown order status {}", raw))
}

fn order_from_row(r: &PgRow) -> anyhow::Result<ShopOrder> {
    Ok(ShopOrder {
        id: r.get("id"),
        invoice_id: r.get("invoice_id"),
        shop_id: r.get("shop_id"),
        shop_name: r.get("shop_name"),
        buyer_id: r.get("buyer_id"),
        shop_voucher_id: r.get("shop_voucher_id"),
        courier_id: r.get("courier_id"),
        subtotal: r.get("subtotal"),
        shop_discount: r.get("shop_discount"),
        marketplace_discount: r.get("marketplace_discount"),
        shipping_cost: r.get("shipping_cost"),
        total: r.get("total"),
        status: order_status(r)?,
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

fn line_from_row(r: &PgRow) -> TransactionLine {
    TransactionLine {
        id: r.get("id"),
        shop_order_id: r.get("invoice_per_shop_id"),
        sku_id: r.get("sku_id"),
        product_id: r.get("product_id"),
        product_name: r.get("product_name"),
        sku_name: r.get("sku_name"),
        quantity: r.get("quantity"),
        unit_price: r.get("unit_price"),
        discounted_unit_price: r.get("discounted_unit_price"),
        total: r.get("total"),
    }
}

fn refund_from_row(r: &PgRow) -> RefundRequest {
    RefundRequest {
        id: r.get("id"),
        shop_order_id: r.get("invoice_per_shop_id"),
        user_id: r.get("user_id"),
        reason: r.get("reason"),
        status: RefundStatus::parse(r.get::<String, _>("status").as_str()),
        created_at: r.get("created_at"),
    }
}

impl SqlxOrderRepository {
    async fn load_detail(&self, order: ShopOrder) -> anyhow::Result<ShopOrderDetail> {
        let lines = sqlx::query(
            r#"SELECT id, invoice_per_shop_id, sku_id, product_id, product_name, sku_name,
                      quantity, unit_price, discounted_unit_price, total
               FROM transactions WHERE invoice_per_shop_id = $1 ORDER BY product_name, sku_name"#,
        )
        .bind(order.id)
        .fetch_all(&self.pool)
        .await?;
        let history = sqlx::query(
            "SELECT status, note, created_at FROM invoice_statuses WHERE invoice_per_shop_id = $1 ORDER BY created_at, id",
        )
        .bind(order.id)
        .fetch_all(&self.pool)
        .await?;
        let history = history
            .iter()
            .map(|r| {
                Ok(StatusEntry {
                    status: order_status(r)?,
                    note: r.get("note"),
                    created_at: r.get("created_at"),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(ShopOrderDetail {
            order,
            lines: lines.iter().map(line_from_row).collect(),
            history,
        })
    }

    async fn list_where(
        &self,
        owner_column: &str,
        owner_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ShopOrder>, i64)> {
        let filter = format!(
            "WHERE {} = $1 AND ($2::text IS NULL OR o.status = $2)",
            owner_column
        );
        let status = status.map(|s| s.as_str());
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM invoice_per_shops o JOIN invoices i ON i.id = o.invoice_id {}",
            filter
        ))
        .bind(owner_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query(&format!(
            "{} {} ORDER BY o.created_at DESC, o.id LIMIT $3 OFFSET $4",
            ORDER_SELECT, filter
        ))
        .bind(owner_id)
        .bind(status)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let items = rows
            .iter()
            .map(order_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok((items, total))
    }
}

#[async_trait]
impl OrderRepository for SqlxOrderRepository {
    async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, CreateInvoiceError> {
        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;

        if let Some(voucher_id) = invoice.marketplace_voucher_id {
            let taken = sqlx::query(
                "UPDATE marketplace_vouchers SET quota = quota - 1 WHERE id = $1 AND quota > 0",
            )
            .bind(voucher_id)
            .execute(&mut *tx)
            .await
            .map_err(anyhow::Error::from)?;
            if taken.rows_affected() == 0 {
                return Err(CreateInvoiceError::VoucherExhausted);
            }
        }

        let row = sqlx::query(&format!(
            r#"INSERT INTO invoices (user_id, address_snapshot, marketplace_voucher_id, total_goods, shop_discount,
                                     marketplace_discount, total_shipping, total_payment)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}"#,
            INVOICE_COLUMNS
        ))
        .bind(invoice.user_id)
        .bind(&invoice.address_snapshot)
        .bind(invoice.marketplace_voucher_id)
        .bind(invoice.total_goods)
        .bind(invoice.shop_discount)
        .bind(invoice.marketplace_discount)
        .bind(invoice.total_shipping)
        .bind(invoice.total_payment)
        .fetch_one(&mut *tx)
        .await
        .map_err(anyhow::Error::from)?;
        let created = invoice_from_row(&row);

        for shop in &invoice.shops {
            if let Some(voucher_id) = shop.shop_voucher_id {
                let taken = sqlx::query(
                    "UPDATE shop_vouchers SET quota = quota - 1 WHERE id = $1 AND quota > 0 AND deleted_at IS NULL",
                )
                .bind(voucher_id)
                .execute(&mut *tx)
                .await
                .map_err(anyhow::Error::from)?;
                if taken.rows_affected() == 0 {
                    return Err(CreateInvoiceError::VoucherExhausted);
                }
            }

            let order_id: Uuid = sqlx::query_scalar(
                r#"INSERT INTO invoice_per_shops (invoice_id, shop_id, shop_voucher_id, courier_id, subtotal,
                                                  shop_discount, marketplace_discount, shipping_cost, total)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id"#,
            )
            .bind(created.id)
            .bind(shop.shop_id)
            .bind(shop.shop_voucher_id)
            .bind(shop.courier_id)
            .bind(shop.subtotal)
            .bind(shop.shop_discount)
            .bind(shop.marketplace_discount)
            .bind(shop.shipping_cost)
            .bind(shop.total)
            .fetch_one(&mut *tx)
            .await
            .map_err(anyhow::Error::from)?;

            sqlx::query("INSERT INTO invoice_statuses (invoice_per_shop_id, status) VALUES ($1, $2)")
                .bind(order_id)
                .bind(OrderStatus::WaitingPayment.as_str())
                .execute(&mut *tx)
                .await
                .map_err(anyhow::Error::from)?;

            for line in &shop.lines {
                let reserved = sqlx::query(
                    "UPDATE skus SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
                )
                .bind(line.sku_id)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await
                .map_err(anyhow::Error::from)?;
                if reserved.rows_affected() == 0 {
                    return Err(CreateInvoiceError::StockExhausted(line.sku_id));
                }

                let removed = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
                    .bind(line.cart_item_id)
                    .bind(invoice.user_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(anyhow::Error::from)?;
                if removed.rows_affected() == 0 {
                    return Err(CreateInvoiceError::CartItemGone(line.cart_item_id));
                }

                sqlx::query(
                    r#"INSERT INTO transactions (invoice_per_shop_id, sku_id, product_id, product_name, sku_name,
                                                 quantity, unit_price, discounted_unit_price, total)
                       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
                )
                .bind(order_id)
                .bind(line.sku_id)
                .bind(line.product_id)
                .bind(&line.product_name)
                .bind(&line.sku_name)
                .bind(line.quantity)
                .bind(line.unit_price)
                .bind(line.discounted_unit_price)
                .bind(line.total)
                .execute(&mut *tx)
                .await
                .map_err(anyhow::Error::from)?;
            }
        }

        tx.commit().await.map_err(anyhow::Error::from)?;
        Ok(created)
    }

    async fn get_invoice(
        &self,
        user_id: Uuid,
        invoice_id: Uuid,
    ) -> anyhow::Result<Option<InvoiceDetail>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM invoices WHERE id = $1 AND user_id = $2",
            INVOICE_COLUMNS
        ))
        .bind(invoice_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let invoice = invoice_from_row(&row);
        let orders = sqlx::query(&format!(
            "{} WHERE o.invoice_id = $1 ORDER BY sh.name",
            ORDER_SELECT
        ))
        .bind(invoice.id)
        .fetch_all(&self.pool)
        .await?;
        let mut shops = Vec::with_capacity(orders.len());
        for r in &orders {
            shops.push(self.load_detail(order_from_row(r)?).await?);
        }
        Ok(Some(InvoiceDetail { invoice, shops }))
    }

    async fn list_for_buyer(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ShopOrder>, i64)> {
        self.list_where("i.user_id", user_id, status, page).await
    }

    async fn list_for_shop(
        &self,
        shop_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ShopOrder>, i64)> {
        self.list_where("o.shop_id", shop_id, status, page).await
    }

    async fn get_shop_order(&self, id: Uuid) -> anyhow::Result<Option<ShopOrderDetail>> {
        let row = sqlx::query(&format!("{} WHERE o.id = $1", ORDER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(r) => Ok(Some(self.load_detail(order_from_row(&r)?).await?)),
            None => Ok(None),
        }
    }

    async fn transition(&self, t: &Transition) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"UPDATE invoice_per_shops o SET status = $3, updated_at = now()
               FROM invoices i
               WHERE o.id = $1 AND o.status = $2 AND i.id = o.invoice_id
               RETURNING o.invoice_id, o.shop_id, i.user_id AS buyer_id"#,
        )
        .bind(t.shop_order_id)
        .bind(t.from.as_str())
        .bind(t.to.as_str())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(false);
        };
        let invoice_id: Uuid = row.get("invoice_id");
        let shop_id: Uuid = row.get("shop_id");
        let buyer_id: Uuid = row.get("buyer_id");

        sqlx::query(
            "INSERT INTO invoice_statuses (invoice_per_shop_id, status, note) VALUES ($1, $2, $3)",
        )
        .bind(t.shop_order_id)
        .bind(t.to.as_str())
        .bind(&t.note)
        .execute(&mut *tx)
        .await?;

        if let Some(amount) = t.refund_buyer.filter(|a| *a > Decimal::ZERO) {
            if !credit_user_wallet(&mut tx, buyer_id, amount, HistoryKind::Refund, t.shop_order_id)
                .await?
            {
                tracing::warn!(shop_order_id = %t.shop_order_id, %buyer_id, "refund_without_wallet");
            }
        }

        if let Some(amount) = t.pay_seller.filter(|a| *a > Decimal::ZERO) {
            let seller_id: Uuid = sqlx::query_scalar("SELECT user_id FROM shops WHERE id = $1")
                .bind(shop_id)
                .fetch_one(&mut *tx)
                .await?;
            if !credit_user_wallet(&mut tx, seller_id, amount, HistoryKind::Income, t.shop_order_id)
                .await?
            {
                tracing::warn!(shop_order_id = %t.shop_order_id, %seller_id, "seller_payout_skipped");
            }
        }

        if t.restock {
            sqlx::query(
                r#"UPDATE skus k SET stock = k.stock + x.quantity
                   FROM transactions x
                   WHERE x.invoice_per_shop_id = $1 AND k.id = x.sku_id"#,
            )
            .bind(t.shop_order_id)
            .execute(&mut *tx)
            .await?;
        }

        if t.count_sold {
            sqlx::query(
                r#"UPDATE products p SET sold_count = p.sold_count + s.quantity
                   FROM (SELECT product_id, SUM(quantity)::int AS quantity FROM transactions
                         WHERE invoice_per_shop_id = $1 GROUP BY product_id) s
                   WHERE p.id = s.product_id"#,
            )
            .bind(t.shop_order_id)
            .execute(&mut *tx)
            .await?;
        }

        match &t.refund {
            Some(RefundChange::Open { user_id, reason }) => {
                sqlx::query(
                    "INSERT INTO refund_requests (invoice_per_shop_id, user_id, reason) VALUES ($1, $2, $3)",
                )
                .bind(t.shop_order_id)
                .bind(user_id)
                .bind(reason)
                .execute(&mut *tx)
                .await?;
            }
            Some(RefundChange::Resolve(status)) => {
                sqlx::query(
                    "UPDATE refund_requests SET status = $2 WHERE invoice_per_shop_id = $1 AND status = 'pending'",
                )
                .bind(t.shop_order_id)
                .bind(status.as_str())
                .execute(&mut *tx)
                .await?;
            }
            None => {}
        }

        if t.to == OrderStatus::Cancelled {
            sqlx::query(
                r#"UPDATE invoices SET status = 'cancelled'
                   WHERE id = $1 AND status = 'waiting_payment'
                     AND NOT EXISTS (SELECT 1 FROM invoice_per_shops
                                     WHERE invoice_id = $1 AND status <> 'cancelled')"#,
            )
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn find_review_target(&self, transaction_id: Uuid) -> anyhow::Result<Option<ReviewTarget>> {
        let row = sqlx::query(
            r#"SELECT x.id, x.product_id, i.user_id AS buyer_id, o.status
               FROM transactions x
               JOIN invoice_per_shops o ON o.id = x.invoice_per_shop_id
               JOIN invoices i ON i.id = o.invoice_id
               WHERE x.id = $1"#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| {
            Ok(ReviewTarget {
                transaction_id: r.get("id"),
                product_id: r.get("product_id"),
                buyer_id: r.get("buyer_id"),
                status: order_status(&r)?,
            })
        })
        .transpose()
    }

    async fn create_review(
        &self,
        target: &ReviewTarget,
        rating: i16,
        comment: Option<&str>,
    ) -> anyhow::Result<Option<Review>> {
        let row = sqlx::query(
            r#"WITH ins AS (
                   INSERT INTO transaction_reviews (transaction_id, user_id, product_id, rating, comment)
                   VALUES ($1, $2, $3, $4, $5)
                   ON CONFLICT (transaction_id) DO NOTHING
                   RETURNING id, transaction_id, product_id, user_id, rating, comment, created_at
               )
               SELECT ins.*, u.username FROM ins JOIN users u ON u.id = ins.user_id"#,
        )
        .bind(target.transaction_id)
        .bind(target.buyer_id)
        .bind(target.product_id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| Review {
            id: r.get("id"),
            transaction_id: r.get("transaction_id"),
            product_id: r.get("product_id"),
            user_id: r.get("user_id"),
            username: r.get("username"),
            rating: r.get("rating"),
            comment: r.get("comment"),
            created_at: r.get("created_at"),
        }))
    }

    async fn list_refunds_for_shop(&self, shop_id: Uuid) -> anyhow::Result<Vec<RefundRequest>> {
        let rows = sqlx::query(
            r#"SELECT r.id, r.invoice_per_shop_id, r.user_id, r.reason, r.status, r.created_at
               FROM refund_requests r
               JOIN invoice_per_shops o ON o.id = r.invoice_per_shop_id
               WHERE o.shop_id = $1
               ORDER BY r.created_at DESC"#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(refund_from_row).collect())
    }

    async fn get_refund(&self, id: Uuid) -> anyhow::Result<Option<RefundRequest>> {
        let row = sqlx::query(
            "SELECT id, invoice_per_shop_id, user_id, reason, status, created_at FROM refund_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(refund_from_row))
    }
}
