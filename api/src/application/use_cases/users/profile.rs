use uuid::Uuid;

use crate::application::ports::user_repository::UserRepository;
use crate::application::use_cases::users::UserError;
use crate::domain::users::user::{ProfileUpdate, User, UserProfile};

const GENDERS: [&str; 2] = ["male", "female"];

pub struct GetProfile<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> GetProfile<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(User, UserProfile), UserError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)?;
        let profile = self.repo.get_profile(user_id).await?;
        Ok((user, profile))
    }
}

pub struct UpdateProfile<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> UpdateProfile<'a, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<(User, UserProfile), UserError> {
        let update = normalize(update)?;
        self.repo.update_profile(user_id, &update).await?;
        GetProfile { repo: self.repo }.execute(user_id).await
    }
}

fn normalize(mut update: ProfileUpdate) -> Result<ProfileUpdate, UserError> {
    if let Some(name) = update.full_name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() || name.chars().count() > 100 {
            return Err(UserError::InvalidInput(
                "full_name must be 1-100 characters".into(),
            ));
        }
    }
    if let Some(phone) = update.phone.as_mut() {
        *phone = phone.trim().to_string();
        let digits = phone.strip_prefix('+').unwrap_or(phone);
        if !(8..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(UserError::InvalidInput("invalid phone number".into()));
        }
    }
    if let Some(gender) = update.gender.as_mut() {
        *gender = gender.trim().to_lowercase();
        if !GENDERS.contains(&gender.as_str()) {
            return Err(UserError::InvalidInput("gender must be male or female".into()));
        }
    }
    if let Some(birth) = update.birth_date {
        if birth > chrono::Utc::now().date_naive() {
            return Err(UserError::InvalidInput("birth_date is in the future".into()));
        }
    }
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::InMemoryUsers;

    #[tokio::test]
    async fn updates_and_reads_back() {
        let users = InMemoryUsers::default();
        let user = users.seed("buyer@example.com", "buyer", "Sup3rSecret");
        let uc = UpdateProfile { repo: &users };
        let (user, profile) = uc
            .execute(
                user.id,
                ProfileUpdate {
                    full_name: Some("  Budi Santoso ".into()),
                    phone: Some("+6281234567890".into()),
                    gender: Some("Male".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.full_name, "Budi Santoso");
        assert_eq!(profile.phone.as_deref(), Some("+6281234567890"));
        assert_eq!(profile.gender.as_deref(), Some("male"));
    }

    #[tokio::test]
    async fn rejects_bad_phone() {
        let users = InMemoryUsers::default();
        let user = users.seed("buyer@example.com", "buyer", "Sup3rSecret");
        let res = UpdateProfile { repo: &users }
            .execute(
                user.id,
                ProfileUpdate {
                    phone: Some("08-12".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(res, Err(UserError::InvalidInput(_))));
    }
}
