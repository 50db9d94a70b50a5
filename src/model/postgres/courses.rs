use async_trait::async_trait;
use uuid::Uuid;

use crate::model::entity::{
    Course, CourseCreate, CourseFilter, CourseModule, CourseUpdate, ModuleCreate,
};
use crate::model::{CourseRepository, DatabaseError, DatabaseResult, PgStore, ResourceType};

#[async_trait]
impl CourseRepository for PgStore {
    async fn create_course(&self, data: CourseCreate) -> DatabaseResult<Course> {
        let result = sqlx::query_as(
            "INSERT INTO courses \
                (id, title, description, difficulty, duration, price, category, image_url, is_published, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.difficulty)
        .bind(&data.duration)
        .bind(data.price)
        .bind(&data.category)
        .bind(&data.image_url)
        .bind(data.is_published)
        .bind(data.created_by)
        .fetch_one(self.executor())
        .await?;
        Ok(result)
    }

    async fn update_course(&self, id: Uuid, data: CourseUpdate) -> DatabaseResult<Course> {
        let result: Option<Course> = sqlx::query_as(
            "UPDATE courses SET \
                title = COALESCE($1, title), \
                description = COALESCE($2, description), \
                difficulty = COALESCE($3, difficulty), \
                category = COALESCE($4, category), \
                duration = COALESCE($5, duration), \
                price = COALESCE($6, price), \
                image_url = COALESCE($7, image_url), \
                is_published = COALESCE($8, is_published), \
                updated_at = now() \
             WHERE id = $9 RETURNING *",
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.difficulty)
        .bind(data.category)
        .bind(data.duration)
        .bind(data.price)
        .bind(data.image_url)
        .bind(data.is_published)
        .bind(id)
        .fetch_optional(self.executor())
        .await?;

        result.ok_or(DatabaseError::NotFound(ResourceType::Course))
    }

    async fn delete_course(&self, id: Uuid) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(self.executor())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(ResourceType::Course));
        }
        Ok(())
    }

    async fn find_course(&self, id: Uuid) -> DatabaseResult<Option<Course>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(self.executor())
            .await?;
        Ok(result)
    }

    async fn list_courses(&self, filter: CourseFilter) -> DatabaseResult<Vec<Course>> {
        // LIMIT NULL means no limit
        let result = sqlx::query_as(
            "SELECT * FROM courses \
             WHERE ($1::BOOLEAN IS NULL OR is_published = $1) \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(filter.published)
        .bind(filter.limit)
        .fetch_all(self.executor())
        .await?;
        Ok(result)
    }

    async fn create_module(&self, data: ModuleCreate) -> DatabaseResult<CourseModule> {
        let result: Option<CourseModule> = sqlx::query_as(
            "INSERT INTO course_modules (id, course_id, title, description, content, order_index) \
             SELECT $1, c.id, $3, $4, $5, \
                    COALESCE($6::INT, (SELECT COALESCE(MAX(m.order_index) + 1, 0) \
                                       FROM course_modules m WHERE m.course_id = c.id)) \
             FROM courses c WHERE c.id = $2 \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.content)
        .bind(data.order_index)
        .fetch_optional(self.executor())
        .await?;

        result.ok_or(DatabaseError::NotFound(ResourceType::Course))
    }

    async fn list_modules(&self, course_id: Uuid) -> DatabaseResult<Vec<CourseModule>> {
        let result = sqlx::query_as(
            "SELECT * FROM course_modules WHERE course_id = $1 ORDER BY order_index ASC, created_at ASC",
        )
        .bind(course_id)
        .fetch_all(self.executor())
        .await?;
        Ok(result)
    }
}
