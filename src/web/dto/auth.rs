use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::entity::{Account, Profile};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SignupBody {
    #[validate(
        required(message = "All fields are required"),
        email(message = "Invalid email address")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "All fields are required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: Option<String>,
    #[validate(
        required(message = "All fields are required"),
        length(min = 1, message = "All fields are required")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "All fields are required"),
        length(min = 1, message = "All fields are required")
    )]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginBody {
    #[validate(
        required(message = "Email and password are required"),
        length(min = 1, message = "Email and password are required")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Email and password are required"),
        length(min = 1, message = "Email and password are required")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn bearer(access_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            token_type: String::from("bearer"),
            expires_at,
        }
    }
}

/// Login identity with its profile attached.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub profile: Option<Profile>,
}

impl AuthUser {
    pub fn new(account: Account, profile: Option<Profile>) -> Self {
        Self {
            id: account.id,
            email: account.email,
            created_at: account.created_at,
            profile,
        }
    }

    /// `/me` works from the profile alone, the account row holds nothing more.
    pub fn from_profile(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            created_at: profile.created_at,
            profile: Some(profile),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: AuthUser,
    pub session: Session,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub session: Session,
    pub user: AuthUser,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub user: AuthUser,
}
