use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ResourceType, ResourceTyped};

/// A unit of course content. Ordering is by `order`, ties are not prevented.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CourseModule {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "order")]
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ModuleCreate {
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub order_index: Option<i32>,
}

impl ResourceTyped for CourseModule {
    fn get_resource_type() -> ResourceType {
        ResourceType::Module
    }
}

impl CourseModule {
    pub fn new(data: ModuleCreate) -> Self {
        Self {
            id: Uuid::new_v4(),
            course_id: data.course_id,
            title: data.title,
            description: data.description,
            content: data.content,
            order_index: data.order_index.unwrap_or(0),
            created_at: Utc::now(),
        }
    }
}
