use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ResourceType, ResourceTyped};
use crate::web::UserRole;

/// Login identity. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AccountCreate {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

/// Partial profile update, `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl ResourceTyped for Account {
    fn get_resource_type() -> ResourceType {
        ResourceType::User
    }
}

impl ResourceTyped for Profile {
    fn get_resource_type() -> ResourceType {
        ResourceType::User
    }
}

impl Profile {
    pub fn new(account: &Account, data: &AccountCreate) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            role: data.role.clone(),
            avatar_url: None,
            bio: None,
            is_active: true,
            created_at: account.created_at,
            updated_at: account.created_at,
        }
    }

    pub fn apply(&mut self, data: ProfileUpdate) {
        if let Some(first_name) = data.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = data.last_name {
            self.last_name = last_name;
        }
        if let Some(bio) = data.bio {
            self.bio = Some(bio);
        }
        if let Some(avatar_url) = data.avatar_url {
            self.avatar_url = Some(avatar_url);
        }
        self.updated_at = Utc::now();
    }
}
