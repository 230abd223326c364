use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::chat_repository::ChatRepository;
use crate::domain::chats::chat::{ChatMessage, ChatRoom, Sender};
use crate::domain::pagination::PageRequest;
use crate::infrastructure::db::PgPool;

pub struct SqlxChatRepository {
    pub pool: PgPool,
}

impl SqlxChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn message_from_row(r: &PgRow) -> ChatMessage {
    ChatMessage {
        id: r.get("id"),
        user_id: r.get("user_id"),
        shop_id: r.get("shop_id"),
        sender: Sender::parse(r.get::<String, _>("sender").as_str()),
        message: r.get("message"),
        created_at: r.get("created_at"),
    }
}

fn room_from_row(r: &PgRow) -> ChatRoom {
    ChatRoom {
        counterpart_id: r.get("counterpart_id"),
        counterpart_name: r.get("counterpart_name"),
        last_message: r.get("message"),
        last_sender: Sender::parse(r.get::<String, _>("sender").as_str()),
        last_at: r.get("created_at"),
    }
}

#[async_trait]
impl ChatRepository for SqlxChatRepository {
    async fn insert(
        &self,
        user_id: Uuid,
        shop_id: Uuid,
        sender: Sender,
        message: &str,
    ) -> anyhow::Result<ChatMessage> {
        let row = sqlx::query(
            r#"INSERT INTO chats (user_id, shop_id, sender, message) VALUES ($1, $2, $3, $4)
               RETURNING id, user_id, shop_id, sender, message, created_at"#,
        )
        .bind(user_id)
        .bind(shop_id)
        .bind(sender.as_str())
        .bind(message)
        .fetch_one(&self.pool)
        .await?;
        Ok(message_from_row(&row))
    }

    async fn list_thread(
        &self,
        user_id: Uuid,
        shop_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ChatMessage>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM chats WHERE user_id = $1 AND shop_id = $2")
                .bind(user_id)
                .bind(shop_id)
                .fetch_one(&self.pool)
                .await?;
        let rows = sqlx::query(
            r#"SELECT id, user_id, shop_id, sender, message, created_at FROM chats
               WHERE user_id = $1 AND shop_id = $2
               ORDER BY created_at DESC, id DESC
               LIMIT $3 OFFSET $4"#,
        )
        .bind(user_id)
        .bind(shop_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok((rows.iter().map(message_from_row).collect(), total))
    }

    async fn rooms_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ChatRoom>> {
        let rows = sqlx::query(
            r#"SELECT * FROM (
                   SELECT DISTINCT ON (c.shop_id) c.shop_id AS counterpart_id, sh.name AS counterpart_name,
                          c.sender, c.message, c.created_at
                   FROM chats c JOIN shops sh ON sh.id = c.shop_id
                   WHERE c.user_id = $1
                   ORDER BY c.shop_id, c.created_at DESC
               ) last ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(room_from_row).collect())
    }

    async fn rooms_for_shop(&self, shop_id: Uuid) -> anyhow::Result<Vec<ChatRoom>> {
        let rows = sqlx::query(
            r#"SELECT * FROM (
                   SELECT DISTINCT ON (c.user_id) c.user_id AS counterpart_id, u.username AS counterpart_name,
                          c.sender, c.message, c.created_at
                   FROM chats c JOIN users u ON u.id = c.user_id
                   WHERE c.shop_id = $1
                   ORDER BY c.user_id, c.created_at DESC
               ) last ORDER BY created_at DESC"#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(room_from_row).collect())
    }
}
