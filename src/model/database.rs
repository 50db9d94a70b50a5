use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::model::error::DatabaseResult;

pub static MAX_CONNECTIONS: u32 = 10;

/// Shared Postgres pool behind `PgStore`.
#[derive(Debug, Clone)]
pub struct DbConnection {
    pool: PgPool, // cloning is cheap, pool is just a wrapper around Arc<>
}

impl DbConnection {
    /// Lazy: nothing is dialed until the first query, so startup does not race the database.
    pub fn connect(database_uri: &str) -> DatabaseResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(database_uri)?;
        tracing::debug!("postgres pool configured, max {MAX_CONNECTIONS} connections");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
