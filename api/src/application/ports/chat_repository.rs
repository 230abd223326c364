use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::chats::chat::{ChatMessage, ChatRoom, Sender};
use crate::domain::pagination::PageRequest;

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn insert(
        &self,
        user_id: Uuid,
        shop_id: Uuid,
        sender: Sender,
        message: &str,
    ) -> anyhow::Result<ChatMessage>;
    // Newest first
    async fn list_thread(
        &self,
        user_id: Uuid,
        shop_id: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<(Vec<ChatMessage>, i64)>;
    async fn rooms_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ChatRoom>>;
    async fn rooms_for_shop(&self, shop_id: Uuid) -> anyhow::Result<Vec<ChatRoom>>;
}
