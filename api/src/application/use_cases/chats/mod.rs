use uuid::Uuid;

use crate::application::ports::chat_repository::ChatRepository;
use crate::application::ports::shop_repository::ShopRepository;
use crate::domain::chats::chat::{ChatMessage, ChatRoom, MAX_MESSAGE_LEN, Sender};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::shops::shop::Shop;

#[derive(thiserror::Error, Debug)]
pub enum ChatError {
    #[error("shop not found")]
    ShopNotFound,
    #[error("open a shop first")]
    ShopRequired,
    #[error("cannot chat with your own shop")]
    OwnShop,
    #[error("message must be 1-1000 characters")]
    InvalidMessage,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub struct Chats<'a, R, S>
where
    R: ChatRepository + ?Sized,
    S: ShopRepository + ?Sized,
{
    pub repo: &'a R,
    pub shops: &'a S,
}

impl<'a, R, S> Chats<'a, R, S>
where
    R: ChatRepository + ?Sized,
    S: ShopRepository + ?Sized,
{
    /// Buyer side: message a shop.
    pub async fn send_to_shop(
        &self,
        user_id: Uuid,
        shop_id: Uuid,
        message: &str,
    ) -> Result<ChatMessage, ChatError> {
        let message = clean(message)?;
        let shop = self.buyer_counterpart(user_id, shop_id).await?;
        Ok(self.repo.insert(user_id, shop.id, Sender::User, message).await?)
    }

    pub async fn thread_with_shop(
        &self,
        user_id: Uuid,
        shop_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ChatMessage>, ChatError> {
        let shop = self.buyer_counterpart(user_id, shop_id).await?;
        let (items, total) = self.repo.list_thread(user_id, shop.id, page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn rooms_for_user(&self, user_id: Uuid) -> Result<Vec<ChatRoom>, ChatError> {
        Ok(self.repo.rooms_for_user(user_id).await?)
    }

    /// Seller side: reply to a user from the caller's shop.
    pub async fn send_to_user(
        &self,
        owner_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> Result<ChatMessage, ChatError> {
        let message = clean(message)?;
        let shop = self.own_shop(owner_id).await?;
        if owner_id == user_id {
            return Err(ChatError::OwnShop);
        }
        Ok(self.repo.insert(user_id, shop.id, Sender::Shop, message).await?)
    }

    pub async fn thread_with_user(
        &self,
        owner_id: Uuid,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ChatMessage>, ChatError> {
        let shop = self.own_shop(owner_id).await?;
        let (items, total) = self.repo.list_thread(user_id, shop.id, page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn rooms_for_shop(&self, owner_id: Uuid) -> Result<Vec<ChatRoom>, ChatError> {
        let shop = self.own_shop(owner_id).await?;
        Ok(self.repo.rooms_for_shop(shop.id).await?)
    }

    async fn buyer_counterpart(&self, user_id: Uuid, shop_id: Uuid) -> Result<Shop, ChatError> {
        let shop = self
            .shops
            .get_by_id(shop_id)
            .await?
            .ok_or(ChatError::ShopNotFound)?;
        if shop.is_owned_by(user_id) {
            return Err(ChatError::OwnShop);
        }
        Ok(shop)
    }

    async fn own_shop(&self, owner_id: Uuid) -> Result<Shop, ChatError> {
        self.shops
            .get_by_owner(owner_id)
            .await?
            .ok_or(ChatError::ShopRequired)
    }
}

fn clean(message: &str) -> Result<&str, ChatError> {
    let trimmed = message.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_MESSAGE_LEN {
        return Err(ChatError::InvalidMessage);
    }
    Ok(trimmed)
}
