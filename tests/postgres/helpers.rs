//! Shared test helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use taskly::task::adapters::postgres::{PostgresTaskRepository, TaskPgPool};
use uuid::Uuid;

/// Environment variable naming the server used by these tests.
pub const TEST_DATABASE_URL_VAR: &str = "TASKLY_TEST_DATABASE_URL";

/// Boxed error type for fallible helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Points every pooled connection at the test schema.
#[derive(Debug)]
struct SearchPath(String);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPath {
    fn on_acquire(&self, connection: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        connection
            .batch_execute(&format!("SET search_path TO {}", self.0))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// A schema private to one test, dropped on drop.
pub struct TestSchema {
    url: String,
    name: String,
    repository: PostgresTaskRepository,
}

impl TestSchema {
    /// Returns the repository bound to this schema.
    pub const fn repository(&self) -> &PostgresTaskRepository {
        &self.repository
    }

    /// Opens a connection scoped to this schema for direct SQL.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or `search_path` update fails.
    pub fn connect(&self) -> Result<PgConnection, BoxError> {
        let mut connection = PgConnection::establish(&self.url)?;
        connection.batch_execute(&format!("SET search_path TO {}", self.name))?;
        Ok(connection)
    }
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        if let Ok(mut connection) = PgConnection::establish(&self.url) {
            let _dropped =
                connection.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name));
        }
    }
}

/// Creates a fresh schema with the `tasks` table applied.
///
/// Returns `Ok(None)` when no test server is configured.
///
/// # Errors
///
/// Returns an error if the schema, pool, or table cannot be created.
pub async fn test_schema() -> Result<Option<TestSchema>, BoxError> {
    let Ok(url) = std::env::var(TEST_DATABASE_URL_VAR) else {
        return Ok(None);
    };
    let name = format!("taskly_test_{}", Uuid::new_v4().simple());

    let mut admin = PgConnection::establish(&url)?;
    admin.batch_execute(&format!("CREATE SCHEMA {name}"))?;

    let pool: TaskPgPool = Pool::builder()
        .max_size(2)
        .connection_customizer(Box::new(SearchPath(name.clone())))
        .build(ConnectionManager::<PgConnection>::new(url.as_str()))?;
    let repository = PostgresTaskRepository::new(pool);
    let schema = TestSchema {
        url,
        name,
        repository,
    };
    schema.repository().apply_schema().await?;
    Ok(Some(schema))
}
