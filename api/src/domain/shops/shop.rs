use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Shop {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub address_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Shop {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}
