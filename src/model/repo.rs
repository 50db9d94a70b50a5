use chrono::NaiveDate;
use uuid::Uuid;

use crate::model::entity::{
    Account, AccountCreate, BookingCreate, Consultation, ConsultationSlot, ConsultationWithSlot,
    Course, CourseCreate, CourseFilter, CourseModule, CourseUpdate, Enrollment,
    EnrollmentWithCourse, ModuleCreate, Profile, ProfileUpdate, ProgressUpdate, SlotCreate,
};
use crate::model::error::DatabaseResult;
use crate::web::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    User,
    Course,
    Module,
    Enrollment,
    ConsultationSlot,
    Consultation,
}

impl ResourceType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Course => "Course",
            Self::Module => "Module",
            Self::Enrollment => "Enrollment",
            Self::ConsultationSlot => "Consultation slot",
            Self::Consultation => "Consultation",
        }
    }
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates the login identity and its profile as one unit.
    async fn create_account(&self, data: AccountCreate) -> DatabaseResult<(Account, Profile)>;
    async fn find_account_by_email(&self, email: &str) -> DatabaseResult<Option<Account>>;
    async fn find_profile(&self, id: Uuid) -> DatabaseResult<Option<Profile>>;
    async fn update_profile(&self, id: Uuid, data: ProfileUpdate) -> DatabaseResult<Profile>;
    async fn set_role(&self, id: Uuid, role: UserRole) -> DatabaseResult<Profile>;
    async fn set_active(&self, id: Uuid, is_active: bool) -> DatabaseResult<Profile>;
    async fn list_profiles(&self, limit: i64, offset: i64) -> DatabaseResult<Vec<Profile>>;
    async fn count_profiles(&self) -> DatabaseResult<i64>;
}

#[async_trait::async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create_course(&self, data: CourseCreate) -> DatabaseResult<Course>;
    async fn update_course(&self, id: Uuid, data: CourseUpdate) -> DatabaseResult<Course>;
    async fn delete_course(&self, id: Uuid) -> DatabaseResult<()>;
    async fn find_course(&self, id: Uuid) -> DatabaseResult<Option<Course>>;
    /// Newest first.
    async fn list_courses(&self, filter: CourseFilter) -> DatabaseResult<Vec<Course>>;
    async fn create_module(&self, data: ModuleCreate) -> DatabaseResult<CourseModule>;
    /// Ascending by `order`.
    async fn list_modules(&self, course_id: Uuid) -> DatabaseResult<Vec<CourseModule>>;
}

#[async_trait::async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Fails with `AlreadyEnrolled` when the pair exists, never inserts twice.
    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> DatabaseResult<Enrollment>;
    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Enrollment>>;
    async fn list_enrollments(&self, user_id: Uuid) -> DatabaseResult<Vec<EnrollmentWithCourse>>;
    /// Conditional write, fails with `VersionMismatch` when another write landed first.
    async fn update_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        data: ProgressUpdate,
    ) -> DatabaseResult<Enrollment>;
}

#[async_trait::async_trait]
pub trait ConsultationRepository: Send + Sync {
    async fn create_slot(&self, data: SlotCreate) -> DatabaseResult<ConsultationSlot>;
    /// Unbooked slots dated `today` or later, earliest first.
    async fn list_available_slots(&self, today: NaiveDate) -> DatabaseResult<Vec<ConsultationSlot>>;
    /// Marks the slot booked and records the consultation atomically.
    async fn book(&self, data: BookingCreate, today: NaiveDate) -> DatabaseResult<Consultation>;
    async fn find_consultation(&self, id: Uuid) -> DatabaseResult<Option<Consultation>>;
    /// `scheduled -> cancelled`, releasing the slot in the same unit.
    async fn cancel(&self, id: Uuid) -> DatabaseResult<Consultation>;
    /// Newest first. `None` lists every user's consultations.
    async fn list_consultations(
        &self,
        user_id: Option<Uuid>,
    ) -> DatabaseResult<Vec<ConsultationWithSlot>>;
}

/// Everything the web layer needs from persistence.
pub trait Store:
    UserRepository + CourseRepository + EnrollmentRepository + ConsultationRepository + std::fmt::Debug
{
}

impl<T> Store for T where
    T: UserRepository
        + CourseRepository
        + EnrollmentRepository
        + ConsultationRepository
        + std::fmt::Debug
{
}
