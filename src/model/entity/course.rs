use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ResourceType, ResourceTyped};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub category: String,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CourseCreate {
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub category: String,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CourseFilter {
    pub limit: Option<i64>,
    pub published: Option<bool>,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> ResourceType {
        ResourceType::Course
    }
}

impl Course {
    pub fn new(data: CourseCreate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            difficulty: data.difficulty,
            duration: data.duration,
            price: data.price,
            category: data.category,
            image_url: data.image_url,
            is_published: data.is_published,
            created_by: data.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, data: CourseUpdate) {
        if let Some(title) = data.title {
            self.title = title;
        }
        if let Some(description) = data.description {
            self.description = description;
        }
        if let Some(difficulty) = data.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(category) = data.category {
            self.category = category;
        }
        if data.duration.is_some() {
            self.duration = data.duration;
        }
        if data.price.is_some() {
            self.price = data.price;
        }
        if data.image_url.is_some() {
            self.image_url = data.image_url;
        }
        if let Some(is_published) = data.is_published {
            self.is_published = is_published;
        }
        self.updated_at = Utc::now();
    }
}
