use uuid::Uuid;

pub const MAX_MESSAGE_LEN: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Shop,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Shop => "shop",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "shop" => Sender::Shop,
            _ => Sender::User,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shop_id: Uuid,
    pub sender: Sender,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Last message of a user/shop thread, seen from one side.
#[derive(Debug, Clone)]
pub struct ChatRoom {
    pub counterpart_id: Uuid,
    pub counterpart_name: String,
    pub last_message: String,
    pub last_sender: Sender,
    pub last_at: chrono::DateTime<chrono::Utc>,
}
