use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::model::entity::{Course, Enrollment, EnrollmentWithCourse, ProgressUpdate};
use crate::model::{
    CourseRepository, DatabaseError, DatabaseResult, EnrollmentRepository, PgStore, ResourceType,
};

#[async_trait]
impl EnrollmentRepository for PgStore {
    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> DatabaseResult<Enrollment> {
        if self.find_course(course_id).await?.is_none() {
            return Err(DatabaseError::NotFound(ResourceType::Course));
        }

        // the unique (user_id, course_id) constraint decides races
        let result: Option<Enrollment> = sqlx::query_as(
            "INSERT INTO enrollments (id, user_id, course_id) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, course_id) DO NOTHING RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(self.executor())
        .await?;

        result.ok_or(DatabaseError::AlreadyEnrolled)
    }

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Enrollment>> {
        let result = sqlx::query_as("SELECT * FROM enrollments WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(self.executor())
            .await?;
        Ok(result)
    }

    async fn list_enrollments(&self, user_id: Uuid) -> DatabaseResult<Vec<EnrollmentWithCourse>> {
        let enrollments: Vec<Enrollment> =
            sqlx::query_as("SELECT * FROM enrollments WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(self.executor())
                .await?;

        let course_ids: Vec<Uuid> = enrollments.iter().map(|e| e.course_id).collect();
        let courses: Vec<Course> = sqlx::query_as("SELECT * FROM courses WHERE id = ANY($1)")
            .bind(&course_ids)
            .fetch_all(self.executor())
            .await?;
        let mut courses: HashMap<Uuid, Course> = courses.into_iter().map(|c| (c.id, c)).collect();

        Ok(enrollments
            .into_iter()
            .map(|enrollment| EnrollmentWithCourse {
                course: courses.remove(&enrollment.course_id),
                enrollment,
            })
            .collect())
    }

    async fn update_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        data: ProgressUpdate,
    ) -> DatabaseResult<Enrollment> {
        let result: Option<Enrollment> = sqlx::query_as(
            "UPDATE enrollments SET \
                progress = $1, \
                completed_modules = $2, \
                version = version + 1, \
                updated_at = now() \
             WHERE user_id = $3 AND course_id = $4 AND version = $5 RETURNING *",
        )
        .bind(data.progress)
        .bind(&data.completed_modules)
        .bind(user_id)
        .bind(course_id)
        .bind(data.expected_version)
        .fetch_optional(self.executor())
        .await?;

        if let Some(enrollment) = result {
            return Ok(enrollment);
        }

        match self.find_enrollment(user_id, course_id).await? {
            Some(current) => Err(DatabaseError::VersionMismatch {
                expected: data.expected_version,
                actual: current.version,
            }),
            None => Err(DatabaseError::NotFound(ResourceType::Enrollment)),
        }
    }
}
