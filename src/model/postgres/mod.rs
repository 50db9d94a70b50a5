//! sqlx-backed store. Multi-statement writes run inside one transaction.

use crate::model::DbConnection;

mod consultations;
mod courses;
mod enrollments;
mod users;

#[derive(Debug, Clone)]
pub struct PgStore {
    db: DbConnection,
}

impl PgStore {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub(crate) fn executor(&self) -> &sqlx::PgPool {
        self.db.pool()
    }
}
