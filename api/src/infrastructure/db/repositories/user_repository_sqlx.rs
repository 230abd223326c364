use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{ProfileUpdate, Role, User, UserCredentials, UserProfile};
use crate::infrastructure::crypto;
use crate::infrastructure::db::PgPool;

pub struct SqlxUserRepository {
    pub pool: PgPool,
    encryption_key: String,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool, encryption_key: String) -> Self {
        Self {
            pool,
            encryption_key,
        }
    }
}

fn user_from_row(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        email: r.get("email"),
        username: r.get("username"),
        full_name: r.get("full_name"),
        role: Role::parse(r.get::<String, _>("role").as_str()),
        created_at: r.get("created_at"),
    }
}

const USER_COLUMNS: &str = "id, email, username, full_name, role, created_at";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        email: &str,
        username: &str,
        full_name: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            "INSERT INTO users (email, username, full_name, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(username)
        .bind(full_name)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;
        let user = user_from_row(&row);
        sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_credentials(&self, identifier: &str) -> anyhow::Result<Option<UserCredentials>> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM users WHERE email = $1 OR username = $1",
            USER_COLUMNS
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| UserCredentials {
            user: user_from_row(&r),
            password_hash: r.get("password_hash"),
        }))
    }

    async fn find_credentials_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserCredentials>> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| UserCredentials {
            user: user_from_row(&r),
            password_hash: r.get("password_hash"),
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_profile(&self, id: Uuid) -> anyhow::Result<UserProfile> {
        let row = sqlx::query(
            r#"SELECT phone, gender, birth_date, avatar_url FROM user_profiles WHERE user_id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row
            .map(|r| UserProfile {
                phone: crypto::decrypt_opt(&self.encryption_key, r.get("phone")),
                gender: r.get("gender"),
                birth_date: r.get("birth_date"),
                avatar_url: r.get("avatar_url"),
            })
            .unwrap_or_default())
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> anyhow::Result<()> {
        let phone = crypto::encrypt_opt(&self.encryption_key, update.phone.as_deref())?;
        let mut tx = self.pool.begin().await?;
        if let Some(full_name) = &update.full_name {
            sqlx::query("UPDATE users SET full_name = $2 WHERE id = $1")
                .bind(id)
                .bind(full_name)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query(
            r#"INSERT INTO user_profiles (user_id, phone, gender, birth_date, avatar_url)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (user_id) DO UPDATE SET
                 phone = COALESCE(EXCLUDED.phone, user_profiles.phone),
                 gender = COALESCE(EXCLUDED.gender, user_profiles.gender),
                 birth_date = COALESCE(EXCLUDED.birth_date, user_profiles.birth_date),
                 avatar_url = COALESCE(EXCLUDED.avatar_url, user_profiles.avatar_url)"#,
        )
        .bind(id)
        .bind(phone)
        .bind(&update.gender)
        .bind(update.birth_date)
        .bind(&update.avatar_url)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}
