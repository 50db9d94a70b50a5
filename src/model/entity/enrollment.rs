use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::entity::Course;
use crate::model::{ResourceType, ResourceTyped};

pub static ENROLLMENT_ACTIVE: &str = "active";

/// Membership of a user in a course. `version` increments on every progress write.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub progress: i32,
    pub completed_modules: Vec<Uuid>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EnrollmentWithCourse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: Option<Course>,
}

/// A progress write that only lands if the stored version still equals `expected_version`.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub progress: i32,
    pub completed_modules: Vec<Uuid>,
    pub expected_version: i64,
}

impl ResourceTyped for Enrollment {
    fn get_resource_type() -> ResourceType {
        ResourceType::Enrollment
    }
}

impl Enrollment {
    pub fn new(user_id: Uuid, course_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            status: ENROLLMENT_ACTIVE.to_string(),
            progress: 0,
            completed_modules: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
