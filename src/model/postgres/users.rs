use async_trait::async_trait;
use uuid::Uuid;

use crate::model::entity::{Account, AccountCreate, Profile, ProfileUpdate};
use crate::model::{DatabaseError, DatabaseResult, PgStore, ResourceType, UserRepository};
use crate::web::UserRole;

#[async_trait]
impl UserRepository for PgStore {
    async fn create_account(&self, data: AccountCreate) -> DatabaseResult<(Account, Profile)> {
        let mut tx = self.executor().begin().await?;

        let account: Option<Account> = sqlx::query_as(
            "INSERT INTO accounts (id, email, password_hash) VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO NOTHING RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(&data.password_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(account) = account else {
            tx.rollback().await?;
            return Err(DatabaseError::EmailTaken);
        };

        let profile: Profile = sqlx::query_as(
            "INSERT INTO profiles (id, email, first_name, last_name, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((account, profile))
    }

    async fn find_account_by_email(&self, email: &str) -> DatabaseResult<Option<Account>> {
        let result = sqlx::query_as("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(self.executor())
            .await?;
        Ok(result)
    }

    async fn find_profile(&self, id: Uuid) -> DatabaseResult<Option<Profile>> {
        let result = sqlx::query_as("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(self.executor())
            .await?;
        Ok(result)
    }

    async fn update_profile(&self, id: Uuid, data: ProfileUpdate) -> DatabaseResult<Profile> {
        let result: Option<Profile> = sqlx::query_as(
            "UPDATE profiles SET \
                first_name = COALESCE($1, first_name), \
                last_name = COALESCE($2, last_name), \
                bio = COALESCE($3, bio), \
                avatar_url = COALESCE($4, avatar_url), \
                updated_at = now() \
             WHERE id = $5 RETURNING *",
        )
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.bio)
        .bind(data.avatar_url)
        .bind(id)
        .fetch_optional(self.executor())
        .await?;

        result.ok_or(DatabaseError::NotFound(ResourceType::User))
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> DatabaseResult<Profile> {
        let result: Option<Profile> = sqlx::query_as(
            "UPDATE profiles SET role = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(role.to_string())
        .bind(id)
        .fetch_optional(self.executor())
        .await?;

        result.ok_or(DatabaseError::NotFound(ResourceType::User))
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> DatabaseResult<Profile> {
        let result: Option<Profile> = sqlx::query_as(
            "UPDATE profiles SET is_active = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(is_active)
        .bind(id)
        .fetch_optional(self.executor())
        .await?;

        result.ok_or(DatabaseError::NotFound(ResourceType::User))
    }

    async fn list_profiles(&self, limit: i64, offset: i64) -> DatabaseResult<Vec<Profile>> {
        let result = sqlx::query_as("SELECT * FROM profiles ORDER BY created_at LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(self.executor())
            .await?;
        Ok(result)
    }

    async fn count_profiles(&self) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(self.executor())
            .await?;
        Ok(result)
    }
}
