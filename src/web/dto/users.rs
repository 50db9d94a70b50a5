use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::entity::{Enrollment, EnrollmentWithCourse, Profile, ProfileUpdate};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ProfileUpdateBody {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[validate(length(max = 2000, message = "Bio is too long"))]
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<ProfileUpdateBody> for ProfileUpdate {
    fn from(value: ProfileUpdateBody) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            bio: value.bio,
            avatar_url: value.avatar_url,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ProgressBody {
    pub progress: Option<i32>,
    pub completed_modules: Option<Vec<Uuid>>,
    /// Enrollment version the client last saw; stale writes get 409
    pub version: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RoleBody {
    #[validate(required(message = "Role is required"))]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct StatusBody {
    #[validate(required(message = "is_active is required"))]
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub profile: Profile,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileUpdatedResponse {
    pub message: String,
    pub profile: Profile,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MyCoursesResponse {
    pub enrollments: Vec<EnrollmentWithCourse>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProgressResponse {
    pub message: String,
    pub enrollment: Enrollment,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserPageResponse {
    pub users: Vec<Profile>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
