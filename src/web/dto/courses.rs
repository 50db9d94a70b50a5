use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::entity::{
    Course, CourseCreate, CourseFilter, CourseModule, CourseUpdate, Enrollment, ModuleCreate,
};

#[derive(Debug, Clone, Copy, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseListQuery {
    /// Maximum number of courses, newest first
    pub limit: Option<i64>,
    /// Only published (`true`) or only drafts (`false`)
    pub published: Option<bool>,
}

impl From<CourseListQuery> for CourseFilter {
    fn from(value: CourseListQuery) -> Self {
        Self {
            limit: value.limit.filter(|limit| *limit > 0),
            published: value.published,
        }
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CourseCreateBody {
    #[validate(
        required(message = "Missing required fields"),
        length(min = 1, message = "Missing required fields")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Missing required fields"),
        length(min = 1, message = "Missing required fields")
    )]
    pub description: Option<String>,
    #[validate(
        required(message = "Missing required fields"),
        length(min = 1, message = "Missing required fields")
    )]
    pub difficulty: Option<String>,
    #[validate(
        required(message = "Missing required fields"),
        length(min = 1, message = "Missing required fields")
    )]
    pub category: Option<String>,
    pub duration: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
}

impl CourseCreateBody {
    /// Call after `validate()`, required fields are present by then.
    pub fn into_create(self, created_by: Uuid) -> CourseCreate {
        CourseCreate {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            difficulty: self.difficulty.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            duration: self.duration,
            price: self.price,
            image_url: self.image_url,
            is_published: self.is_published.unwrap_or(false),
            created_by: Some(created_by),
        }
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CourseUpdateBody {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
}

impl From<CourseUpdateBody> for CourseUpdate {
    fn from(value: CourseUpdateBody) -> Self {
        Self {
            title: value.title,
            description: value.description,
            difficulty: value.difficulty,
            category: value.category,
            duration: value.duration,
            price: value.price,
            image_url: value.image_url,
            is_published: value.is_published,
        }
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ModuleCreateBody {
    #[validate(
        required(message = "Module title is required"),
        length(min = 1, message = "Module title is required")
    )]
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    /// Position inside the course, appended last when omitted
    #[validate(range(min = 0, message = "Module order cannot be negative"))]
    pub order: Option<i32>,
}

impl ModuleCreateBody {
    pub fn into_create(self, course_id: Uuid) -> ModuleCreate {
        ModuleCreate {
            course_id,
            title: self.title.unwrap_or_default(),
            description: self.description,
            content: self.content,
            order_index: self.order,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseListResponse {
    pub courses: Vec<Course>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseWithModules {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<CourseModule>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseDetailResponse {
    pub course: CourseWithModules,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseResponse {
    pub message: String,
    pub course: Course,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EnrollmentResponse {
    pub message: String,
    pub enrollment: Enrollment,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleListResponse {
    pub modules: Vec<CourseModule>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleResponse {
    pub message: String,
    pub module: CourseModule,
}
