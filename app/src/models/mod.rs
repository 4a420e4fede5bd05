use crate::config::Config;
use crate::error::DBError;
use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

macro_rules! sql_stmnt {
    ($ret:ident, $stmt:expr) => {
        sqlx::query_as::<_ ,$ret>($stmt)
    };
    ($stmt:expr) => {
        sqlx::query($stmt)
    };
    ($ret:ident, $stmt:expr, $($bind:expr),*) => {
        sqlx::query_as::<_ ,$ret>($stmt)$(.bind($bind))*
    };
    ($stmt:expr, $($bind:expr),*) => {
        sqlx::query($stmt)$(.bind($bind))*
    };
}

pub async fn establish_db_connection(config: &Config) -> Result<sqlx::PgPool, DBError> {
    Ok(sqlx::postgres::PgPoolOptions::new()
        .connect(config.database_url())
        .await?)
}

pub async fn check_schema(conn: &sqlx::PgPool) -> Result<(), DBError> {
    let sensors = sql_stmnt!(CountRecord, "SELECT count(*) as count FROM sensors")
        .fetch_one(conn)
        .await?;
    let sensor_methods = sql_stmnt!(CountRecord, "SELECT count(*) as count FROM sensor_methods")
        .fetch_one(conn)
        .await?;
    debug!(
        sensors = sensors.count.unwrap_or(0),
        sensor_methods = sensor_methods.count.unwrap_or(0),
        "Schema is readable"
    );
    Ok(())
}

#[derive(sqlx::FromRow)]
pub(crate) struct CountRecord {
    pub count: Option<i64>,
}

#[derive(sqlx::FromRow)]
pub(crate) struct IdRecord {
    pub id: i32,
}

/// Store access for one table.
///
/// Reads always hit the store, nothing is cached between calls.
/// `create` and `delete` of one instance never run concurrently.
#[async_trait]
pub trait Repository: Send + Sync {
    type Row: Send;
    type CreateParams: Send;

    /// Exactly one row, or the table's not-found error
    async fn find(&self, id: i32) -> Result<Self::Row, DBError>;

    /// Rows ordered by id; ids without a row are skipped
    async fn find_all(&self, ids: Option<&[i32]>) -> Result<Vec<Self::Row>, DBError>;

    /// Returns the id assigned by the store
    async fn create(&self, params: Self::CreateParams) -> Result<i32, DBError>;

    /// Succeeds whether or not the row existed
    async fn delete(&self, id: i32) -> Result<(), DBError>;
}

/// Critical section around the writes of a single repository instance.
#[derive(Debug, Default)]
pub struct WriteLock {
    inner: Mutex<()>,
}

/// Held while a write runs, released when dropped.
pub struct WriteGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl WriteLock {
    pub fn new() -> Self {
        WriteLock::default()
    }

    pub async fn enter(&self) -> WriteGuard<'_> {
        WriteGuard {
            _guard: self.inner.lock().await,
        }
    }
}

pub mod sensor;
pub mod sensor_method;

#[cfg(test)]
pub mod mock;
