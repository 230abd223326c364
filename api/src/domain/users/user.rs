use uuid::Uuid;

pub const MAX_ADDRESSES_PER_USER: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Login lookup row; the only place a password hash leaves the repository.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub recipient: String,
    pub phone: String,
    pub province_id: i32,
    pub city_id: i32,
    pub street: String,
    pub postal_code: String,
    pub is_default: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Address {
    /// Human readable snapshot stored on invoices.
    pub fn snapshot(&self) -> String {
        format!(
            "{} ({}) - {}, {}",
            self.recipient, self.phone, self.street, self.postal_code
        )
    }
}

#[derive(Debug, Clone)]
pub struct NewAddress {
    pub label: String,
    pub recipient: String,
    pub phone: String,
    pub province_id: i32,
    pub city_id: i32,
    pub street: String,
    pub postal_code: String,
}
