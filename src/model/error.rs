use thiserror::Error;

use crate::model::ResourceType;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("record not found: {0:?}")]
    NotFound(ResourceType),
    #[error("email is already registered")]
    EmailTaken,
    #[error("user is already enrolled in this course")]
    AlreadyEnrolled,
    #[error("slot is already booked or in the past")]
    SlotUnavailable,
    #[error("consultation is not scheduled")]
    NotScheduled,
    #[error("version mismatch, expected {expected} but found {actual}")]
    VersionMismatch { expected: i64, actual: i64 },
}
