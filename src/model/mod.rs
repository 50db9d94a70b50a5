use std::sync::Arc;

mod database;
pub use database::DbConnection;

pub mod entity;

mod error;
pub use error::{DatabaseError, DatabaseResult};

mod repo;
pub use repo::{
    ConsultationRepository, CourseRepository, EnrollmentRepository, ResourceType, ResourceTyped,
    Store, UserRepository,
};

mod memory;
pub use memory::MemoryStore;

mod postgres;
pub use postgres::PgStore;

pub mod progress;

#[derive(Debug, Clone)]
pub struct ModelManager {
    store: Arc<dyn Store>,
}

impl ModelManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn postgres(conn: DbConnection) -> Self {
        Self::new(Arc::new(PgStore::new(conn)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}
