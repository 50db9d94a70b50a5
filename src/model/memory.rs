//! In-process store. Every mutation runs under one write lock, which gives the
//! same all-or-nothing behaviour the Postgres store gets from transactions.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::entity::{
    Account, AccountCreate, BookingCreate, Consultation, ConsultationSlot, ConsultationStatus,
    ConsultationWithSlot, Course, CourseCreate, CourseFilter, CourseModule, CourseUpdate,
    Enrollment, EnrollmentWithCourse, ModuleCreate, Profile, ProfileUpdate, ProgressUpdate,
    SlotCreate, available_slots,
};
use crate::model::{
    ConsultationRepository, CourseRepository, DatabaseError, DatabaseResult,
    EnrollmentRepository, ResourceType, UserRepository,
};
use crate::web::UserRole;

#[derive(Debug, Default)]
struct Tables {
    accounts: Vec<Account>,
    profiles: Vec<Profile>,
    courses: Vec<Course>,
    modules: Vec<CourseModule>,
    enrollments: Vec<Enrollment>,
    slots: Vec<ConsultationSlot>,
    consultations: Vec<Consultation>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn profile_mut(&mut self, id: Uuid) -> DatabaseResult<&mut Profile> {
        self.profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DatabaseError::NotFound(ResourceType::User))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_account(&self, data: AccountCreate) -> DatabaseResult<(Account, Profile)> {
        let mut tables = self.tables.write().await;
        if tables.accounts.iter().any(|a| a.email == data.email) {
            return Err(DatabaseError::EmailTaken);
        }

        let account = Account {
            id: Uuid::new_v4(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            created_at: Utc::now(),
        };
        let profile = Profile::new(&account, &data);

        tables.accounts.push(account.clone());
        tables.profiles.push(profile.clone());
        Ok((account, profile))
    }

    async fn find_account_by_email(&self, email: &str) -> DatabaseResult<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_profile(&self, id: Uuid) -> DatabaseResult<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn update_profile(&self, id: Uuid, data: ProfileUpdate) -> DatabaseResult<Profile> {
        let mut tables = self.tables.write().await;
        let profile = tables.profile_mut(id)?;
        profile.apply(data);
        Ok(profile.clone())
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> DatabaseResult<Profile> {
        let mut tables = self.tables.write().await;
        let profile = tables.profile_mut(id)?;
        profile.role = role;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> DatabaseResult<Profile> {
        let mut tables = self.tables.write().await;
        let profile = tables.profile_mut(id)?;
        profile.is_active = is_active;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn list_profiles(&self, limit: i64, offset: i64) -> DatabaseResult<Vec<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_profiles(&self) -> DatabaseResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.len() as i64)
    }
}

#[async_trait]
impl CourseRepository for MemoryStore {
    async fn create_course(&self, data: CourseCreate) -> DatabaseResult<Course> {
        let course = Course::new(data);
        self.tables.write().await.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: Uuid, data: CourseUpdate) -> DatabaseResult<Course> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DatabaseError::NotFound(ResourceType::Course))?;
        course.apply(data);
        Ok(course.clone())
    }

    async fn delete_course(&self, id: Uuid) -> DatabaseResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.courses.len();
        tables.courses.retain(|c| c.id != id);
        if tables.courses.len() == before {
            return Err(DatabaseError::NotFound(ResourceType::Course));
        }

        // mirrors ON DELETE CASCADE
        tables.modules.retain(|m| m.course_id != id);
        tables.enrollments.retain(|e| e.course_id != id);
        Ok(())
    }

    async fn find_course(&self, id: Uuid) -> DatabaseResult<Option<Course>> {
        let tables = self.tables.read().await;
        Ok(tables.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn list_courses(&self, filter: CourseFilter) -> DatabaseResult<Vec<Course>> {
        let tables = self.tables.read().await;
        let mut courses: Vec<Course> = tables
            .courses
            .iter()
            .rev()
            .filter(|c| filter.published.is_none_or(|p| c.is_published == p))
            .cloned()
            .collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            courses.truncate(limit.max(0) as usize);
        }
        Ok(courses)
    }

    async fn create_module(&self, mut data: ModuleCreate) -> DatabaseResult<CourseModule> {
        let mut tables = self.tables.write().await;
        if !tables.courses.iter().any(|c| c.id == data.course_id) {
            return Err(DatabaseError::NotFound(ResourceType::Course));
        }
        if data.order_index.is_none() {
            let next = tables
                .modules
                .iter()
                .filter(|m| m.course_id == data.course_id)
                .map(|m| m.order_index + 1)
                .max()
                .unwrap_or(0);
            data.order_index = Some(next);
        }
        let module = CourseModule::new(data);
        tables.modules.push(module.clone());
        Ok(module)
    }

    async fn list_modules(&self, course_id: Uuid) -> DatabaseResult<Vec<CourseModule>> {
        let tables = self.tables.read().await;
        let mut modules: Vec<CourseModule> = tables
            .modules
            .iter()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect();
        modules.sort_by_key(|m| (m.order_index, m.created_at));
        Ok(modules)
    }
}

#[async_trait]
impl EnrollmentRepository for MemoryStore {
    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> DatabaseResult<Enrollment> {
        let mut tables = self.tables.write().await;
        if !tables.courses.iter().any(|c| c.id == course_id) {
            return Err(DatabaseError::NotFound(ResourceType::Course));
        }
        if tables
            .enrollments
            .iter()
            .any(|e| e.user_id == user_id && e.course_id == course_id)
        {
            return Err(DatabaseError::AlreadyEnrolled);
        }

        let enrollment = Enrollment::new(user_id, course_id);
        tables.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Option<Enrollment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }

    async fn list_enrollments(&self, user_id: Uuid) -> DatabaseResult<Vec<EnrollmentWithCourse>> {
        let tables = self.tables.read().await;
        let mut enrollments: Vec<EnrollmentWithCourse> = tables
            .enrollments
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .map(|e| EnrollmentWithCourse {
                enrollment: e.clone(),
                course: tables.courses.iter().find(|c| c.id == e.course_id).cloned(),
            })
            .collect();
        enrollments.sort_by(|a, b| b.enrollment.created_at.cmp(&a.enrollment.created_at));
        Ok(enrollments)
    }

    async fn update_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        data: ProgressUpdate,
    ) -> DatabaseResult<Enrollment> {
        let mut tables = self.tables.write().await;
        let enrollment = tables
            .enrollments
            .iter_mut()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .ok_or(DatabaseError::NotFound(ResourceType::Enrollment))?;

        if enrollment.version != data.expected_version {
            return Err(DatabaseError::VersionMismatch {
                expected: data.expected_version,
                actual: enrollment.version,
            });
        }

        enrollment.progress = data.progress;
        enrollment.completed_modules = data.completed_modules;
        enrollment.version += 1;
        enrollment.updated_at = Utc::now();
        Ok(enrollment.clone())
    }
}

#[async_trait]
impl ConsultationRepository for MemoryStore {
    async fn create_slot(&self, data: SlotCreate) -> DatabaseResult<ConsultationSlot> {
        let slot = ConsultationSlot::new(data);
        self.tables.write().await.slots.push(slot.clone());
        Ok(slot)
    }

    async fn list_available_slots(&self, today: NaiveDate) -> DatabaseResult<Vec<ConsultationSlot>> {
        let tables = self.tables.read().await;
        Ok(available_slots(&tables.slots, today))
    }

    async fn book(&self, data: BookingCreate, today: NaiveDate) -> DatabaseResult<Consultation> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .slots
            .iter_mut()
            .find(|s| s.id == data.slot_id)
            .ok_or(DatabaseError::NotFound(ResourceType::ConsultationSlot))?;

        if !slot.is_available(today) {
            return Err(DatabaseError::SlotUnavailable);
        }
        slot.is_booked = true;

        let consultation = Consultation::new(data);
        tables.consultations.push(consultation.clone());
        Ok(consultation)
    }

    async fn find_consultation(&self, id: Uuid) -> DatabaseResult<Option<Consultation>> {
        let tables = self.tables.read().await;
        Ok(tables.consultations.iter().find(|c| c.id == id).cloned())
    }

    async fn cancel(&self, id: Uuid) -> DatabaseResult<Consultation> {
        let mut tables = self.tables.write().await;
        let consultation = tables
            .consultations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DatabaseError::NotFound(ResourceType::Consultation))?;

        if consultation.status != ConsultationStatus::Scheduled {
            return Err(DatabaseError::NotScheduled);
        }
        consultation.status = ConsultationStatus::Cancelled;
        consultation.updated_at = Utc::now();
        let cancelled = consultation.clone();

        if let Some(slot) = tables.slots.iter_mut().find(|s| s.id == cancelled.slot_id) {
            slot.is_booked = false;
        }
        Ok(cancelled)
    }

    async fn list_consultations(
        &self,
        user_id: Option<Uuid>,
    ) -> DatabaseResult<Vec<ConsultationWithSlot>> {
        let tables = self.tables.read().await;
        let mut consultations: Vec<ConsultationWithSlot> = tables
            .consultations
            .iter()
            .rev()
            .filter(|c| user_id.is_none_or(|id| c.user_id == id))
            .map(|c| ConsultationWithSlot {
                consultation: c.clone(),
                slot: tables.slots.iter().find(|s| s.id == c.slot_id).cloned(),
            })
            .collect();
        consultations.sort_by(|a, b| b.consultation.created_at.cmp(&a.consultation.created_at));
        Ok(consultations)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::NaiveTime;

    use super::*;

    async fn seeded_course(store: &MemoryStore) -> Course {
        store
            .create_course(CourseCreate {
                title: String::from("Rust"),
                description: String::from("Ownership"),
                difficulty: String::from("beginner"),
                category: String::from("programming"),
                duration: None,
                price: None,
                image_url: None,
                is_published: true,
                created_by: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn enrollments_list_newest_first() {
        let store = MemoryStore::new();
        let first = seeded_course(&store).await;
        let second = seeded_course(&store).await;
        let user = Uuid::new_v4();

        store.enroll(user, first.id).await.unwrap();
        store.enroll(user, second.id).await.unwrap();
        store.enroll(Uuid::new_v4(), first.id).await.unwrap();

        let listed = store.list_enrollments(user).await.unwrap();
        let course_ids: Vec<Uuid> = listed.iter().map(|e| e.enrollment.course_id).collect();
        assert_eq!(course_ids, vec![second.id, first.id]);
        assert!(listed.iter().all(|e| e.course.is_some()));
    }

    #[tokio::test]
    async fn concurrent_enrollments_insert_once() {
        let store = Arc::new(MemoryStore::new());
        let course_id = seeded_course(&store).await.id;
        let user = Uuid::new_v4();

        let (a, b) = tokio::join!(
            {
                let store = store.clone();
                tokio::spawn(async move { store.enroll(user, course_id).await })
            },
            {
                let store = store.clone();
                tokio::spawn(async move { store.enroll(user, course_id).await })
            }
        );
        let results = [a.unwrap(), b.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(DatabaseError::AlreadyEnrolled)))
        );
        assert_eq!(store.list_enrollments(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_bookings_take_slot_once() {
        let store = Arc::new(MemoryStore::new());
        let today = Utc::now().date_naive();
        let slot_id = store
            .create_slot(SlotCreate {
                date: today,
                time: NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
                duration_minutes: 30,
            })
            .await
            .unwrap()
            .id;

        let book = |user: Uuid| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .book(
                        BookingCreate {
                            slot_id,
                            user_id: user,
                            topic: String::from("career"),
                            description: None,
                        },
                        today,
                    )
                    .await
            })
        };

        let (a, b) = tokio::join!(book(Uuid::new_v4()), book(Uuid::new_v4()));
        let results = [a.unwrap(), b.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(DatabaseError::SlotUnavailable)))
        );
        assert!(store.list_available_slots(today).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_releases_slot_and_is_not_idempotent() {
        let store = MemoryStore::new();
        let today = Utc::now().date_naive();
        let slot = store
            .create_slot(SlotCreate {
                date: today.succ_opt().unwrap(),
                time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                duration_minutes: 60,
            })
            .await
            .unwrap();

        let booked = store
            .book(
                BookingCreate {
                    slot_id: slot.id,
                    user_id: Uuid::new_v4(),
                    topic: String::from("portfolio review"),
                    description: Some(String::from("bring links")),
                },
                today,
            )
            .await
            .unwrap();
        assert!(store.list_available_slots(today).await.unwrap().is_empty());

        let cancelled = store.cancel(booked.id).await.unwrap();
        assert_eq!(cancelled.status, ConsultationStatus::Cancelled);
        assert_eq!(store.list_available_slots(today).await.unwrap().len(), 1);

        assert!(matches!(
            store.cancel(booked.id).await,
            Err(DatabaseError::NotScheduled)
        ));
    }

    #[tokio::test]
    async fn stale_progress_write_is_rejected() {
        let store = MemoryStore::new();
        let course = seeded_course(&store).await;
        let user = Uuid::new_v4();
        store.enroll(user, course.id).await.unwrap();

        let write = |expected_version, progress| ProgressUpdate {
            progress,
            completed_modules: Vec::new(),
            expected_version,
        };

        let first = store.update_progress(user, course.id, write(0, 40)).await.unwrap();
        assert_eq!(first.version, 1);

        let stale = store.update_progress(user, course.id, write(0, 10)).await;
        assert!(matches!(
            stale,
            Err(DatabaseError::VersionMismatch {
                expected: 0,
                actual: 1
            })
        ));

        let found = store.find_enrollment(user, course.id).await.unwrap().unwrap();
        assert_eq!(found.progress, 40);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let create = || AccountCreate {
            email: String::from("a@b.com"),
            password_hash: String::from("hash"),
            first_name: String::from("A"),
            last_name: String::from("B"),
            role: UserRole::Student,
        };

        let (account, profile) = store.create_account(create()).await.unwrap();
        assert_eq!(account.id, profile.id);
        assert_eq!(profile.role, UserRole::Student);
        assert!(matches!(
            store.create_account(create()).await,
            Err(DatabaseError::EmailTaken)
        ));
    }
}
